pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Path the signaling transport is mounted on.
pub const SIGNALING_PATH: &str = "/ws";
