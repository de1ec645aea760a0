// Byte-level helpers shared by the KLV and track modules

pub mod encoding;
pub mod io;
