//! Table commands against the caret block.

use crate::editor::command::{NoOpReason, TableCommand};
use crate::editor::context::EditorContext;
use crate::model::table::TableError;

impl From<TableError> for NoOpReason {
    fn from(value: TableError) -> Self {
        match value {
            TableError::Floor => Self::StructuralFloor,
            TableError::OutOfRange { .. } => Self::InvalidTarget,
        }
    }
}

pub(crate) fn apply(ctx: &mut EditorContext, command: TableCommand) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    ctx.document_mut().update(caret.block, |content| {
        let table = content.table_mut().ok_or(NoOpReason::KindMismatch)?;
        match command {
            TableCommand::AddRow => table.add_row(),
            TableCommand::AddColumn => table.add_column(),
            TableCommand::RemoveRow(index) => table.remove_row(index)?,
            TableCommand::RemoveColumn(index) => table.remove_column(index)?,
            TableCommand::SetCell { row, col, text } => table.set_cell(row, col, text)?,
        }
        Ok(())
    })?
}
