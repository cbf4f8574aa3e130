pub use self::{
    push::{Claims, PushHeader, Urgency, DEFAULT_TTL},
    subscription::{Deregister, PublicKey, Push, Register},
};

mod push;
mod subscription;
