pub mod social;

pub use social::{SocialResolver, SocialVideo};
