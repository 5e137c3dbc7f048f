//! Многослойная сеть прямого распространения: топология, веса, смещения и
//! функции активации по слоям, расчет выхода по входному вектору.
//!
//! Порядок весов в плоском буфере (см. [`Parameters::set_weights_from_flat_buffer`]):
//! послойно от входа к выходу, внутри слоя по выходным нейронам, внутри нейрона
//! по номерам входов.

pub use self::activation::*;
pub use self::builder::*;
pub use self::error::*;
pub use self::layer_topology::*;
pub use self::model_file::*;
pub use self::network::*;
pub use self::tensor_net::*;

mod activation;
mod builder;
mod error;
mod layer_topology;
mod model_file;
mod network;
mod tensor_net;

use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use candle_core::{Device, Tensor};
use candle_nn::{seq, Linear, Module, Sequential};
use itertools::Itertools;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
