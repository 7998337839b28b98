#[allow(dead_code)]
pub mod raw_upstream;
#[allow(dead_code)]
pub mod socket_guard;
