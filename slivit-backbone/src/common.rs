pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use log::{info, warn};
pub use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::Debug,
    path::{Path, PathBuf},
};
pub use tch::{
    nn::{self, ModuleT as _},
    Device, Kind, Tensor,
};
