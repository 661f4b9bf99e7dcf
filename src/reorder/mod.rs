//! Interactive drag-reorder engine for grid fields

pub mod autoscroll;
pub mod commit;
pub mod placeholder;
pub mod position;
pub mod selection;
pub mod session;
pub mod timer;
pub mod traits;
pub mod visuals;

pub use autoscroll::{AutoscrollController, AutoscrollState, ScrollDelaySchedule};
pub use commit::{apply_move, CommitResolver, CommitResult, MoveDescription, RefreshKind};
pub use placeholder::{DragDirection, PlaceholderBounds, PlaceholderTracker};
pub use position::{PositionResolver, ViewportSnapshot};
pub use selection::{dragged_range, is_contiguous, DraggedRange};
pub use session::{
    ArmRefusal, DragPhase, DragSession, EngineSettings, EventDisposition, FieldReorderEngine,
    HeaderHit, PointerEvent,
};
pub use traits::{
    DragVisuals, GridViewport, MoveHistory, ReorderListener, ScrollDirection, SelectionSource,
    VisibleFieldSpan,
};
pub use visuals::{RecordingVisuals, SessionVisuals, VisualCall};
