//! Smart-HTTP fetch protocol
//!
//! - `pkt_line`: length-prefixed framing
//! - `advertisement`: `info/refs` discovery and ref selection
//! - `negotiation`: want/done request bodies
//! - `side_band`: pack extraction from the upload-pack response
//! - `smart_http`: the HTTP client tying these together

pub mod advertisement;
pub mod negotiation;
pub mod pkt_line;
pub mod side_band;
pub mod smart_http;

pub const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";
