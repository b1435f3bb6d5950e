/// Open-ended metadata value. Documents carry these opaquely; only caller
/// supplied filters ever look inside them.
pub type Value = serde_json::Value;
