pub use duet_state;
pub use duet_state::db;

mod backend;
pub use backend::Backend;

mod session;
pub use session::{AuthState, Session};

mod view;
pub use view::{CollectionView, FetchState, FetchTicket, FilterState, PagePreset};

pub mod editor;
pub use editor::{
    AdminError, AdminTable, DeleteConfirmation, EditorError, EditorState, RecordEditor,
};

#[cfg(test)]
mod testing;
