//! Container format handlers.
//!
//! Two layouts are supported:
//!
//! - [`jffs2`]: a JFFS2 node stream, the layout actually used by
//!   `cgi_config.bin` blobs carved out of MStar DVR firmware
//! - [`record`]: a generic length-prefixed record container, kept for
//!   vendor variants that repack the same content without JFFS2 framing
//!
//! [`detect::detect_format`] picks the handler from the blob's content.

pub mod detect;
pub mod jffs2;
pub mod record;
pub mod traits;

pub use detect::ContainerKind;
pub use detect::detect_format;
pub use jffs2::Jffs2Image;
pub use record::RecordContainer;
pub use traits::ContainerFormat;
