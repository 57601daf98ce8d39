mod expansion;

pub use expansion::expand_tilde;
