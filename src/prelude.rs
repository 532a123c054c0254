//! Crate prelude.

// The actual prelude.
pub use crate::{
    error::SetError,
    ops::Relation,
    set::{Capability, Members, Set},
    table::{Entry, Table},
    utils::{Rank, SetId},
    value::{Scalar, Value},
    Operand,
};

// Convenient imports within the crate.
pub(crate) use crate::{
    error::Result,
    utils::{Path, Visited},
    SmallVec,
};
pub(crate) use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt::{Debug, Display, Formatter, Result as FmtResult, Write},
    rc::Rc,
};
pub(crate) use tracing::{debug, trace, warn};
