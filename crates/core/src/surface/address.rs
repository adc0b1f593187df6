//! Static mapping between wire note/controller numbers and grid geometry.

/// First control-change number used by the column faders. The fader right
/// after the last column is the background (master) fader.
pub const FADER_CONTROLLER_BASE: u8 = 48;

/// First note number used by the buttons under each fader.
pub const FADER_BUTTON_NOTE_BASE: u8 = 100;

/// What a fader controller number addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaderTarget {
    Column(usize),
    Background,
}

/// Pure address space of a `columns` x `rows` grid controller.
///
/// Grid notes run row-major from note 0; note 0 sits on the row furthest
/// from the faders, which is the highest variant row. Variant row 0 is the
/// row next to the faders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSurfaceAddressSpace {
    columns: usize,
    rows: usize,
}

impl ControlSurfaceAddressSpace {
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn grid_note_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Resolves a grid note to `(column, row)`.
    pub fn grid_cell(&self, note: u8) -> Option<(usize, usize)> {
        let index = note as usize;
        if index >= self.grid_note_count() {
            return None;
        }
        let column = index % self.columns;
        let row_from_far_edge = index / self.columns;
        Some((column, self.rows - 1 - row_from_far_edge))
    }

    pub fn grid_note(&self, column: usize, row: usize) -> Option<u8> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = (self.rows - 1 - row) * self.columns + column;
        u8::try_from(index).ok()
    }

    pub fn fader_target(&self, controller: u8) -> Option<FaderTarget> {
        let index = controller.checked_sub(FADER_CONTROLLER_BASE)? as usize;
        match index.cmp(&self.columns) {
            std::cmp::Ordering::Less => Some(FaderTarget::Column(index)),
            std::cmp::Ordering::Equal => Some(FaderTarget::Background),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn fader_button_column(&self, note: u8) -> Option<usize> {
        let column = note.checked_sub(FADER_BUTTON_NOTE_BASE)? as usize;
        (column < self.columns).then_some(column)
    }

    pub fn fader_button_note(&self, column: usize) -> Option<u8> {
        if column >= self.columns {
            return None;
        }
        u8::try_from(FADER_BUTTON_NOTE_BASE as usize + column).ok()
    }
}
