//! Default value functions for serde deserialization.

pub fn scale() -> u32 {
    5
}

pub fn config_path() -> &'static str {
    "configs/mapper.yaml"
}
