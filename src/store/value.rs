//! Scalar values accepted by [`KeyValueStore::set`](super::KeyValueStore::set).

/// A scalar value that can be written under a key
///
/// The store keeps everything as bytes. Numbers are written in their decimal
/// text form so they can be parsed back with `get_as_integer` / `get_as_float`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoreValue {
    /// Native byte representation written to the store
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoreValue::Text(text) => text.as_bytes().to_vec(),
            StoreValue::Bytes(bytes) => bytes.clone(),
            StoreValue::Integer(value) => value.to_string().into_bytes(),
            StoreValue::Float(value) => float_text(*value).into_bytes(),
        }
    }

    /// Short name of the variant, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            StoreValue::Text(_) => "text",
            StoreValue::Bytes(_) => "bytes",
            StoreValue::Integer(_) => "integer",
            StoreValue::Float(_) => "float",
        }
    }
}

/// Shortest round-trip decimal text
///
/// Integral values keep a `.0`. Exponents carry a sign and at least two
/// digits: `1e+16`, `1.5e-07`.
pub(crate) fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::Text(value)
    }
}

impl From<Vec<u8>> for StoreValue {
    fn from(value: Vec<u8>) -> Self {
        StoreValue::Bytes(value)
    }
}

impl From<&[u8]> for StoreValue {
    fn from(value: &[u8]) -> Self {
        StoreValue::Bytes(value.to_vec())
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Integer(value)
    }
}

impl From<i32> for StoreValue {
    fn from(value: i32) -> Self {
        StoreValue::Integer(i64::from(value))
    }
}

impl From<u32> for StoreValue {
    fn from(value: u32) -> Self {
        StoreValue::Integer(i64::from(value))
    }
}

impl From<f64> for StoreValue {
    fn from(value: f64) -> Self {
        StoreValue::Float(value)
    }
}

impl From<f32> for StoreValue {
    fn from(value: f32) -> Self {
        StoreValue::Float(f64::from(value))
    }
}
