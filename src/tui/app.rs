//! # TUI Application
//!
//! Ties the session `Store` to the screens. Owns the current view, the
//! back stack, the search and chat overlays, and the channel that
//! background requests report on.
//!
//! Every fetch is started with `spawn_cancellable` and its `CancelHandle`
//! is stored inside the view (or overlay) that asked for it. Replacing the
//! view drops the old one, which cancels whatever it was still waiting for.
//! Results are also matched against the current view before being applied,
//! so a result that was already queued for a dead view is ignored.
//!
//! The startup token check is owned by the app too. Signing in or out
//! drops it, and a rejection that still arrives is checked against the
//! token that is signed in now.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::api::{ApiError, CancelHandle, Post, PostsBackend, spawn_cancellable};
use crate::core::action::{
    Action, EDIT_FORBIDDEN_MESSAGE, LOGIN_FAILED_MESSAGE, LOGIN_SUCCESS_MESSAGE,
    LOGOUT_MESSAGE, POST_CREATED_MESSAGE, POST_UPDATED_MESSAGE,
};
use crate::core::startup::{TokenRejected, spawn_token_check};
use crate::core::state::SessionState;
use crate::core::store::Store;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ChatEvent, ChatPanelState, FlashTracker, LoginEvent, LoginForm, PostEditorEvent,
    PostEditorState, PostListEvent, PostListState, PostViewEvent, PostViewState, SearchEvent,
    SearchState,
};
use crate::tui::event::TuiEvent;

/// Messages sent from background requests to the event loop.
#[derive(Debug)]
pub enum AppMessage {
    Dispatch(Action),
    LoginFinished,
    Feed(Option<Vec<Post>>),
    ProfilePosts {
        username: String,
        posts: Option<Vec<Post>>,
    },
    SearchResults {
        term: String,
        posts: Option<Vec<Post>>,
    },
    Post {
        id: String,
        post: Option<Post>,
    },
    /// New post id, or the message to show in the editor.
    PostCreated(Result<String, String>),
    PostEdited {
        id: String,
        result: Result<(), String>,
    },
    TokenRejected(TokenRejected),
}

impl From<Action> for AppMessage {
    fn from(action: Action) -> Self {
        AppMessage::Dispatch(action)
    }
}

impl From<TokenRejected> for AppMessage {
    fn from(rejected: TokenRejected) -> Self {
        AppMessage::TokenRejected(rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Profile(String),
    Post(String),
    CreatePost,
    EditPost(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(String),
}

pub enum View {
    Guest(LoginForm),
    Feed(PostListState),
    Profile {
        username: String,
        posts: PostListState,
    },
    Post(PostViewState),
    Editor {
        mode: EditorMode,
        state: PostEditorState,
    },
}

impl View {
    pub fn route(&self) -> Route {
        match self {
            View::Guest(_) | View::Feed(_) => Route::Home,
            View::Profile { username, .. } => Route::Profile(username.clone()),
            View::Post(state) => Route::Post(state.id.clone()),
            View::Editor {
                mode: EditorMode::Create,
                ..
            } => Route::CreatePost,
            View::Editor {
                mode: EditorMode::Edit(id),
                ..
            } => Route::EditPost(id.clone()),
        }
    }
}

/// What a fetched post means for the current view.
enum PostOutcome {
    Stale,
    Shown,
    EditForbidden,
    EditUnavailable,
}

/// Display timings from the resolved config.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub flash_duration: Duration,
    pub search_debounce: Duration,
}

pub struct App {
    pub store: Store,
    pub view: View,
    pub search: Option<SearchState>,
    pub chat: ChatPanelState,
    pub flash: FlashTracker,
    pub timings: Timings,
    history: Vec<Route>,
    /// Startup token check; dropped once the session changes.
    token_check: Option<CancelHandle>,
    backend: Arc<dyn PostsBackend>,
    tx: Sender<AppMessage>,
}

impl App {
    pub fn new(
        store: Store,
        backend: Arc<dyn PostsBackend>,
        tx: Sender<AppMessage>,
        timings: Timings,
    ) -> Self {
        let mut app = Self {
            store,
            view: View::Guest(LoginForm::new()),
            search: None,
            chat: ChatPanelState::new(),
            flash: FlashTracker::new(),
            timings,
            history: Vec::new(),
            token_check: None,
            backend,
            tx,
        };
        app.view = app.build_view(Route::Home);
        app
    }

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    /// Validates the stored token, if any. The result arrives as
    /// `AppMessage::TokenRejected`.
    pub fn start_token_check(&mut self) {
        self.token_check = spawn_token_check(self.backend.clone(), self.state(), self.tx.clone());
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Runs an action through the store, then brings the views in line with
    /// the new state.
    pub fn dispatch(&mut self, action: Action) {
        if matches!(action, Action::Login(_) | Action::Logout) && self.token_check.take().is_some()
        {
            debug!("Session changed, cancelling the startup token check");
        }
        self.store.dispatch(action);
        self.reconcile();
    }

    fn reconcile(&mut self) {
        self.flash
            .sync(&self.store.state().flash_messages, Instant::now());

        // Home shows the sign-in form or the feed depending on login
        let logged_in = self.state().logged_in;
        let stale_home = match self.view {
            View::Guest(_) => logged_in,
            View::Feed(_) | View::Editor { .. } => !logged_in,
            _ => false,
        };
        if stale_home {
            self.view = self.build_view(Route::Home);
        }

        match (self.state().is_search_open, self.search.is_some()) {
            (true, false) => self.search = Some(SearchState::new()),
            (false, true) => self.search = None,
            _ => {}
        }

        // Opening the chat marks everything as read
        if self.state().is_chat_open && self.state().unread_chat_count > 0 {
            self.store.dispatch(Action::ClearUnreadChatCount);
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate(&mut self, route: Route) {
        let current = self.view.route();
        if current == route {
            return;
        }
        info!("Navigate: {:?} -> {:?}", current, route);
        self.history.push(current);
        self.view = self.build_view(route);
    }

    pub fn back(&mut self) {
        if let Some(route) = self.history.pop() {
            info!("Back to {:?}", route);
            self.view = self.build_view(route);
        }
    }

    /// Swaps the current view for `route` without recording it in history.
    fn replace(&mut self, route: Route) {
        info!("Replace: {:?} -> {:?}", self.view.route(), route);
        self.view = self.build_view(route);
    }

    fn build_view(&self, route: Route) -> View {
        match route {
            Route::Home => match self.state().current_user() {
                Some(user) => {
                    let mut posts = PostListState::loading();
                    posts.request = Some(self.spawn_feed(user.token.clone()));
                    View::Feed(posts)
                }
                None => View::Guest(LoginForm::new()),
            },
            Route::Profile(username) => {
                let mut posts = PostListState::loading();
                posts.request = Some(self.spawn_profile_posts(username.clone()));
                View::Profile { username, posts }
            }
            Route::Post(id) => {
                let mut state = PostViewState::new(id.clone());
                state.request = Some(self.spawn_post(id));
                View::Post(state)
            }
            // Authoring needs a session; reconcile also leaves these on sign-out
            Route::CreatePost | Route::EditPost(_) if !self.state().logged_in => {
                self.build_view(Route::Home)
            }
            Route::CreatePost => View::Editor {
                mode: EditorMode::Create,
                state: PostEditorState::new(),
            },
            Route::EditPost(id) => {
                let mut state = PostEditorState::loading();
                state.request = Some(self.spawn_post(id.clone()));
                View::Editor {
                    mode: EditorMode::Edit(id),
                    state,
                }
            }
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Returns true when the app should quit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::ForceQuit => return true,
            TuiEvent::Resize => return false,
            TuiEvent::OpenSearch => {
                self.dispatch(Action::OpenSearch);
                return false;
            }
            TuiEvent::GoHome => {
                self.dispatch(Action::CloseSearch);
                self.navigate(Route::Home);
                return false;
            }
            TuiEvent::ToggleChat => {
                if self.state().logged_in {
                    self.dispatch(Action::ToggleChat);
                }
                return false;
            }
            TuiEvent::OwnProfile => {
                let route = self
                    .state()
                    .current_user()
                    .map(|user| Route::Profile(user.username.clone()));
                if let Some(route) = route {
                    self.dispatch(Action::CloseSearch);
                    self.navigate(route);
                }
                return false;
            }
            TuiEvent::NewPost => {
                if self.state().logged_in {
                    self.dispatch(Action::CloseSearch);
                    self.navigate(Route::CreatePost);
                }
                return false;
            }
            TuiEvent::SignOut => {
                if self.state().logged_in {
                    self.dispatch(Action::Logout);
                    self.dispatch(Action::AddFlashMessage(LOGOUT_MESSAGE.to_string()));
                }
                return false;
            }
            _ => {}
        }

        // Overlays take input before the view underneath
        if let Some(search) = self.search.as_mut() {
            match search.handle_event(&event) {
                Some(SearchEvent::Close) => self.dispatch(Action::CloseSearch),
                Some(SearchEvent::Open(id)) => {
                    self.dispatch(Action::CloseSearch);
                    self.navigate(Route::Post(id));
                }
                None => {}
            }
            return false;
        }

        if self.state().is_chat_open && self.state().logged_in {
            match self.chat.handle_event(&event) {
                Some(ChatEvent::Close) => self.dispatch(Action::CloseChat),
                Some(ChatEvent::Send(text)) => {
                    let username = self.state().user.username.clone();
                    self.chat.push(&username, text);
                }
                None => {}
            }
            return false;
        }

        if event == TuiEvent::Escape {
            self.back();
            return false;
        }

        if let View::Guest(form) = &mut self.view {
            if let Some(LoginEvent::Submit { username, password }) = form.handle_event(&event) {
                let handle = self.spawn_login(username, password);
                if let View::Guest(form) = &mut self.view {
                    form.pending = Some(handle);
                }
            }
            return false;
        }

        if let View::Editor { mode, state } = &mut self.view {
            if let Some(PostEditorEvent::Save { title, body }) = state.handle_event(&event) {
                let mode = mode.clone();
                self.save_post(mode, title, body);
            }
            return false;
        }

        let viewer = self.state().current_user().map(|user| user.username.clone());
        let next = match &mut self.view {
            View::Guest(_) | View::Editor { .. } => None,
            View::Feed(posts) | View::Profile { posts, .. } => posts
                .handle_event(&event)
                .map(|PostListEvent::Open(id)| Route::Post(id)),
            View::Post(state) => {
                let id = state.id.clone();
                match state.handle_event(&event) {
                    Some(PostViewEvent::OpenAuthor(username)) => Some(Route::Profile(username)),
                    Some(PostViewEvent::Edit { author }) if viewer.as_ref() == Some(&author) => {
                        Some(Route::EditPost(id))
                    }
                    Some(PostViewEvent::Edit { .. }) => {
                        debug!("Not editing post {}: written by someone else", id);
                        None
                    }
                    None => None,
                }
            }
        };
        if let Some(route) = next {
            self.navigate(route);
        }
        false
    }

    fn save_post(&mut self, mode: EditorMode, title: String, body: String) {
        let Some(token) = self.state().current_user().map(|user| user.token.clone()) else {
            return;
        };
        let handle = match mode {
            EditorMode::Create => self.spawn_create_post(title, body, token),
            EditorMode::Edit(id) => self.spawn_edit_post(id, title, body, token),
        };
        if let View::Editor { state, .. } = &mut self.view {
            state.request = Some(handle);
        }
    }

    // ========================================================================
    // Background results
    // ========================================================================

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Dispatch(action) => self.dispatch(action),
            AppMessage::LoginFinished => {
                if let View::Guest(form) = &mut self.view {
                    form.pending = None;
                }
            }
            AppMessage::Feed(posts) => {
                if let View::Feed(list) = &mut self.view {
                    apply_posts(list, posts);
                }
            }
            AppMessage::ProfilePosts { username, posts } => match &mut self.view {
                View::Profile {
                    username: current,
                    posts: list,
                } if *current == username => apply_posts(list, posts),
                _ => debug!("Dropping profile posts for {}: view changed", username),
            },
            AppMessage::SearchResults { term, posts } => match self.search.as_mut() {
                Some(search) if search.searched_term.as_deref() == Some(term.as_str()) => {
                    apply_posts(&mut search.results, posts)
                }
                _ => debug!("Dropping stale search results for '{}'", term),
            },
            AppMessage::Post { id, post } => match self.apply_post(&id, post) {
                PostOutcome::Shown => {}
                PostOutcome::Stale => debug!("Dropping post {}: view changed", id),
                PostOutcome::EditForbidden => {
                    warn!("Refusing to edit post {}: written by someone else", id);
                    self.dispatch(Action::AddFlashMessage(EDIT_FORBIDDEN_MESSAGE.to_string()));
                    self.replace(Route::Home);
                }
                PostOutcome::EditUnavailable => self.back(),
            },
            AppMessage::PostCreated(result) => {
                let View::Editor {
                    mode: EditorMode::Create,
                    state,
                } = &mut self.view
                else {
                    debug!("Dropping create-post result: view changed");
                    return;
                };
                match result {
                    Ok(id) => {
                        self.dispatch(Action::AddFlashMessage(POST_CREATED_MESSAGE.to_string()));
                        self.replace(Route::Post(id));
                    }
                    Err(message) => state.save_finished(Some(message)),
                }
            }
            AppMessage::PostEdited { id, result } => {
                let View::Editor {
                    mode: EditorMode::Edit(editing),
                    state,
                } = &mut self.view
                else {
                    debug!("Dropping edit result for {}: view changed", id);
                    return;
                };
                if *editing != id {
                    debug!("Dropping edit result for {}: view changed", id);
                    return;
                }
                match result {
                    Ok(()) => {
                        state.save_finished(None);
                        self.dispatch(Action::AddFlashMessage(POST_UPDATED_MESSAGE.to_string()));
                        self.back();
                    }
                    Err(message) => state.save_finished(Some(message)),
                }
            }
            AppMessage::TokenRejected(rejected) => {
                self.token_check = None;
                for action in rejected.actions_for(self.state()) {
                    self.dispatch(action);
                }
            }
        }
    }

    fn apply_post(&mut self, id: &str, post: Option<Post>) -> PostOutcome {
        let username = self.state().current_user().map(|user| user.username.clone());
        match &mut self.view {
            View::Post(state) if state.id == id => {
                match post {
                    Some(post) => state.set_post(post),
                    None => state.fail(),
                }
                PostOutcome::Shown
            }
            View::Editor {
                mode: EditorMode::Edit(editing),
                state,
            } if editing.as_str() == id => match post {
                Some(post) if username.as_deref() == Some(post.author.username.as_str()) => {
                    state.prefill(post);
                    PostOutcome::Shown
                }
                Some(_) => PostOutcome::EditForbidden,
                None => PostOutcome::EditUnavailable,
            },
            _ => PostOutcome::Stale,
        }
    }

    /// Time-driven work: sends a search once the user stops typing.
    pub fn tick(&mut self, now: Instant) {
        let debounce = self.timings.search_debounce;
        let Some(term) = self
            .search
            .as_mut()
            .and_then(|search| search.take_due(now, debounce))
        else {
            return;
        };
        let handle = self.spawn_search(term);
        if let Some(search) = self.search.as_mut() {
            // Replacing the handle cancels the previous search
            search.results.request = Some(handle);
        }
    }

    /// True while something on screen changes without input.
    pub fn is_animating(&self, now: Instant) -> bool {
        let loading = match &self.view {
            View::Guest(form) => form.is_pending(),
            View::Feed(posts) | View::Profile { posts, .. } => posts.is_loading,
            View::Post(state) => state.post.is_none() && !state.failed,
            View::Editor { state, .. } => state.loading || state.request.is_some(),
        };
        loading
            || self.flash.any_visible(now, self.timings.flash_duration)
            || self
                .search
                .as_ref()
                .is_some_and(|s| s.is_debouncing() || s.results.is_loading)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    fn spawn_login(&self, username: String, password: String) -> CancelHandle {
        info!("Signing in as {}", username);
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        spawn_cancellable(
            "login",
            async move { backend.login(&username, &password).await },
            move |result| {
                send(&tx, AppMessage::LoginFinished);
                match result {
                    Ok(Some(user)) => {
                        send(&tx, Action::Login(user).into());
                        send(
                            &tx,
                            Action::AddFlashMessage(LOGIN_SUCCESS_MESSAGE.to_string()).into(),
                        );
                    }
                    Ok(None) => send(
                        &tx,
                        Action::AddFlashMessage(LOGIN_FAILED_MESSAGE.to_string()).into(),
                    ),
                    Err(e) => warn!("There was a problem signing in: {}", e),
                }
            },
        )
    }

    fn spawn_feed(&self, token: String) -> CancelHandle {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        spawn_cancellable(
            "home feed",
            async move { backend.home_feed(&token).await },
            move |result| send(&tx, AppMessage::Feed(log_failure("home feed", result))),
        )
    }

    fn spawn_profile_posts(&self, username: String) -> CancelHandle {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let name = username.clone();
        spawn_cancellable(
            format!("profile posts for {username}"),
            async move { backend.profile_posts(&name).await },
            move |result| {
                let posts = log_failure("profile posts", result);
                send(&tx, AppMessage::ProfilePosts { username, posts });
            },
        )
    }

    fn spawn_search(&self, term: String) -> CancelHandle {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let query = term.clone();
        spawn_cancellable(
            format!("search '{term}'"),
            async move { backend.search(&query).await },
            move |result| {
                let posts = log_failure("search", result);
                send(&tx, AppMessage::SearchResults { term, posts });
            },
        )
    }

    fn spawn_post(&self, id: String) -> CancelHandle {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let post_id = id.clone();
        spawn_cancellable(
            format!("post {id}"),
            async move { backend.post(&post_id).await },
            move |result| {
                let post = log_failure("post", result);
                send(&tx, AppMessage::Post { id, post });
            },
        )
    }

    fn spawn_create_post(&self, title: String, body: String, token: String) -> CancelHandle {
        info!("Creating post '{}'", title);
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        spawn_cancellable(
            "create post",
            async move { backend.create_post(&title, &body, &token).await },
            move |result| {
                let result = result.map_err(|e| {
                    warn!("There was a problem creating the post: {}", e);
                    save_error(&e)
                });
                send(&tx, AppMessage::PostCreated(result));
            },
        )
    }

    fn spawn_edit_post(&self, id: String, title: String, body: String, token: String) -> CancelHandle {
        info!("Saving post {}", id);
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let post_id = id.clone();
        spawn_cancellable(
            format!("edit post {id}"),
            async move { backend.edit_post(&post_id, &title, &body, &token).await },
            move |result| {
                let result = result.map_err(|e| {
                    warn!("There was a problem saving post {}: {}", id, e);
                    save_error(&e)
                });
                send(&tx, AppMessage::PostEdited { id, result });
            },
        )
    }
}

fn save_error(error: &ApiError) -> String {
    match error {
        ApiError::Rejected(message) => message.clone(),
        _ => "There was a problem saving the post.".to_string(),
    }
}

fn apply_posts(list: &mut PostListState, posts: Option<Vec<Post>>) {
    match posts {
        Some(posts) => list.set_posts(posts),
        None => list.fail(),
    }
}

fn log_failure<T>(what: &str, result: Result<T, ApiError>) -> Option<T> {
    result
        .map_err(|e| warn!("There was a problem loading {}: {}", what, e))
        .ok()
}

fn send(tx: &Sender<AppMessage>, message: AppMessage) {
    if tx.send(message).is_err() {
        warn!("Failed to deliver request result: receiver dropped");
    }
}
