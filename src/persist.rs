pub(crate) mod client;
pub(crate) mod credentials;
pub(crate) mod record;
