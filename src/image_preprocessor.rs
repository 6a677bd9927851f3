pub mod impl_resize;
pub mod interface;
