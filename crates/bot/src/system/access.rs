use std::collections::HashSet;

/// Список операторов, которым разрешена работа с ботом
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    users: HashSet<i64>,
}

impl AccessList {
    pub fn new(users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn is_authorized(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
