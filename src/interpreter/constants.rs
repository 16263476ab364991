// Reserved operator names and tokens for the calculator

/// Opens a scope frame: consumes a scope-kind code and a frame name
pub const PUSH_LOCALS: &str = "_push_locals";

/// Closes and drains the innermost scope frame: consumes the frame name
pub const POP_LOCALS: &str = "_pop_locals";

pub const DEFUN: &str = "defun";
pub const END: &str = "end";
pub const TIMES: &str = "times";
pub const END_TIMES: &str = "end-times";

/// Keywords that are executed even while a body is being captured
pub const STRUCTURAL_KEYWORDS: [&str; 4] = [DEFUN, END, TIMES, END_TIMES];

/// Token the lexer inserts after every `end-times`
pub const USE_TIMES: &str = "*_use_times";

/// Frame name used for loop iterations
pub const LOOP_FRAME_NAME: &str = "times";

/// Upper bound on queued elements after a loop is expanded
pub const MAX_PENDING_ELEMENTS: usize = 1 << 24;
