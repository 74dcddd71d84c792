//! # TUI Components
//!
//! All UI components for the terminal client.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as parameters:
//! - `Header`: top bar with user, shortcuts and unread chat badge
//! - `FlashMessages`: the notifications currently on screen
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `LoginForm`: username/password form on the guest home screen
//! - `PostListState`: selectable list for feed, profile and search results
//! - `SearchState`: debounced search overlay
//! - `ChatPanelState`: chat side panel
//! - `PostViewState`: a single post
//! - `PostEditorState`: title/body form for writing or editing a post
//!
//! Stateful components that fetch data keep the request's `CancelHandle`
//! in their own state, so dropping the component cancels the request.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── header.rs          (top bar)
//! ├── flash_messages.rs  (notifications + display timing)
//! ├── login_form.rs      (sign-in form)
//! ├── post_list.rs       (post list state + render wrapper)
//! ├── post_view.rs       (single post)
//! ├── post_editor.rs     (create/edit form)
//! ├── search_overlay.rs  (search overlay)
//! └── chat_panel.rs      (chat panel)
//! ```

pub mod chat_panel;
pub mod flash_messages;
pub mod header;
pub mod login_form;
pub mod post_editor;
pub mod post_list;
pub mod post_view;
pub mod search_overlay;

pub use chat_panel::{ChatEvent, ChatPanel, ChatPanelState};
pub use flash_messages::{FlashMessages, FlashTracker};
pub use header::Header;
pub use login_form::{LoginEvent, LoginForm};
pub use post_editor::{PostEditor, PostEditorEvent, PostEditorState};
pub use post_list::{PostList, PostListEvent, PostListState};
pub use post_view::{PostView, PostViewEvent, PostViewState};
pub use search_overlay::{SearchEvent, SearchOverlay, SearchState};
