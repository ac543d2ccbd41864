pub use crate::error::{Error, Result};
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::Itertools as _;
pub use log::{info, warn};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    fmt::Debug,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
pub use tch::{vision, Kind, Tensor};
