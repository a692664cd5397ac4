use domain::{RoomId, TodoId};

pub const TODOS_NAMESPACE: &str = "/todos";
pub const ROOMS_NAMESPACE: &str = "/rooms";

/// キーバリューストアのキー構造
pub struct StorageKeys;

impl StorageKeys {
    /// `/todos/{roomId}/{id}`
    pub fn todo(room_id: &RoomId, todo_id: &TodoId) -> String {
        format!("{}/{}/{}", TODOS_NAMESPACE, room_id.as_str(), todo_id.as_str())
    }

    /// ルーム内の全 ToDo を列挙するためのプレフィックス
    pub fn todo_prefix(room_id: &RoomId) -> String {
        format!("{}/{}/", TODOS_NAMESPACE, room_id.as_str())
    }

    /// `/rooms/{id}`
    pub fn room(room_id: &RoomId) -> String {
        format!("{}/{}", ROOMS_NAMESPACE, room_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::from_string(id.to_string()).unwrap()
    }

    #[test]
    fn test_todo_key() {
        let todo_id = TodoId::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string()).unwrap();
        assert_eq!(
            StorageKeys::todo(&room("kitchen"), &todo_id),
            "/todos/kitchen/01ARZ3NDEKTSV4RRFFQ69G5FAV"
        );
    }

    #[test]
    fn test_todo_prefix_has_trailing_slash() {
        assert_eq!(StorageKeys::todo_prefix(&room("kitchen")), "/todos/kitchen/");
        // "kit" のプレフィックスが "kitchen" のキーに一致しない
        assert!(!StorageKeys::todo(
            &room("kitchen"),
            &TodoId::from_string("t".to_string()).unwrap()
        )
        .starts_with(&StorageKeys::todo_prefix(&room("kit"))));
    }

    #[test]
    fn test_room_key_is_case_sensitive() {
        assert_eq!(StorageKeys::room(&room("Kitchen")), "/rooms/Kitchen");
        assert_ne!(StorageKeys::room(&room("Kitchen")), StorageKeys::room(&room("kitchen")));
    }
}
