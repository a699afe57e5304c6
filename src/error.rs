//! Error types shared by the codec, graph and reconstruction modules.

/// Reasons a graph cannot be walked as an Eulerian path or circuit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    #[error("{count} node(s) differ in inbound and outbound degree by more than one")]
    Unbalanced { count: usize },
    #[error("{count} semi-balanced node(s); an Eulerian walk needs 0 or 2")]
    SemiBalanced { count: usize },
    #[error("two semi-balanced nodes but not exactly one head and one tail")]
    MismatchedEndpoints,
    #[error("walk consumed {visited} of {total} edges; graph is not connected")]
    Disconnected { visited: usize, total: usize },
}

/// Errors returned by the assembly core.
///
/// Variants stay distinct so callers sweeping over parameters can tell a
/// wrong fragment length apart from a graph with no Eulerian walk.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Size mismatch: graph expects fragments of length {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Offset {offset} out of range for sequence of length {len}")]
    OutOfRange { offset: usize, len: usize },
    #[error("Capacity exceeded: buffer holds at most {capacity} symbols")]
    CapacityExceeded { capacity: usize },
    #[error("Invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("This graph is not Eulerian: {0}")]
    NotEulerian(Infeasibility),
    #[error("Graph has no edges to walk")]
    EmptyGraph,
    #[error("Cannot assemble an empty walk")]
    EmptyWalk,
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
