//! Parameter codec
//!
//! Converts the loosely-typed call description stored with a transaction
//! into a typed argument vector.
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::codec::{decode_params, ParamValue};
//!
//! let params = decode_params(Some(
//!     r#"[{"name": "_required", "type": "int", "value": "0x2"}]"#,
//! ))
//! .unwrap();
//! assert_eq!(params, vec![ParamValue::Int(2.into())]);
//! ```

pub mod params;

pub use params::{
    convert_param, decode_params, format_hex, parse_int, CodecError, ParamType, ParamValue,
};
