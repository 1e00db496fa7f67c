//! Asset preparation that runs ahead of a session: rotation patches and overview thumbnails.

pub mod rotation;
pub mod thumbnails;
