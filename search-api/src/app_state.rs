use std::sync::Arc;

use crate::domain::search::SearchRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SearchRepository>,
}

impl AppState {
    pub fn new(repository: Arc<SearchRepository>) -> Self {
        Self { repository }
    }
}
