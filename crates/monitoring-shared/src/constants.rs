/// Application name
pub const APP_NAME: &str = "Мониторинг";

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5100";

/// Default path of the real-time chat hub, relative to the base URL
pub const DEFAULT_HUB_PATH: &str = "/chatHub";

/// Default work item page size
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Login user search only queries the backend from this many characters on
pub const MIN_USER_SEARCH_CHARS: usize = 3;

/// Persisted client state keys
pub const STORAGE_KEY_TOKEN: &str = "jwtToken";
pub const STORAGE_KEY_USER_NAME: &str = "userName";
pub const STORAGE_KEY_DIVISION: &str = "divisionId";

/// File name of the persisted credential store
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// JWT claim carrying the numeric user id
pub const CLAIM_NAME_IDENTIFIER: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

/// Date format used by the backend for query parameters
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Hub method names (client -> server)
pub const HUB_GET_FRIENDS: &str = "GetFriends";
pub const HUB_GET_ALL_USERS_EXCEPT_ME: &str = "GetAllUsersExceptMe";
pub const HUB_GET_PRIVATE_MESSAGES: &str = "GetPrivateMessages";
pub const HUB_SEND_PRIVATE_MESSAGE: &str = "SendPrivateMessage";
pub const HUB_SEND_GROUP_MESSAGE: &str = "SendGroupMessage";
pub const HUB_ADD_FRIEND: &str = "AddFriend";
pub const HUB_REMOVE_FRIEND: &str = "RemoveFriend";
pub const HUB_DELETE_MESSAGE: &str = "DeleteMessage";
pub const HUB_CLEAR_PRIVATE_HISTORY: &str = "ClearPrivateHistory";
pub const HUB_CLEAR_GROUP_HISTORY: &str = "ClearGroupHistory";

/// Hub method names (server -> client)
pub const HUB_RECEIVE_PRIVATE_MESSAGE: &str = "ReceivePrivateMessage";
pub const HUB_RECEIVE_GROUP_MESSAGE: &str = "ReceiveGroupMessage";
