use super::*;

mod common;
use common::*;
