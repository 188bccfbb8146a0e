//! Wire types shared between the studio client and anything that speaks the
//! processing backend's HTTP contract.

pub mod domain;
pub mod error;
pub mod protocol;
