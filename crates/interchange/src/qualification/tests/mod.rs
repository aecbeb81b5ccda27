mod common;
mod resolution;
mod routing;
