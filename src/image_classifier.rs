pub mod impl_fake;
pub mod impl_top_k;
pub mod interface;
