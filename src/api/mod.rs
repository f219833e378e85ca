pub mod auth;
pub mod engagement;
pub mod error;
pub mod follow;
pub mod grade;
pub mod health;
pub mod messages;
pub mod posts;
pub mod profile;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::infrastructure::AppState;

/// Pictures and wall photos travel through multipart bodies.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn api_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        // Posts
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/search", get(posts::search_posts))
        .route("/posts/user/:user_id", get(posts::list_user_posts))
        .route(
            "/posts/like",
            get(engagement::like_status).post(engagement::toggle_like),
        )
        .route(
            "/posts/comment",
            get(engagement::list_comments).post(engagement::add_comment),
        )
        .route(
            "/posts/share",
            get(engagement::share_status).post(engagement::toggle_share),
        )
        .route("/posts/:post_id", axum::routing::delete(posts::delete_post))
        // Follow graph
        .route("/follow", post(follow::follow))
        .route("/follow/check", get(follow::check_follow))
        // Users
        .route("/users/search", get(users::search_users))
        .route("/users/followers/search", get(users::search_followers))
        .route(
            "/users/mutual-followers/search",
            get(users::search_mutual_followers),
        )
        .route("/users/suggested", get(users::suggested_users))
        .route("/users/:user_id", get(users::get_user))
        .route("/users/:user_id/followers", get(follow::list_followers))
        .route("/users/:user_id/following", get(follow::list_following))
        // Profile
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Messages
        .route(
            "/messages",
            get(messages::list_conversations).post(messages::send_message),
        )
        .route("/messages/conversation", post(messages::start_conversation))
        .route("/messages/unread/count", get(messages::unread_count))
        .route("/messages/:conversation_id", get(messages::read_conversation))
        // Grade
        .route(
            "/proxy",
            get(grade::prediction_health).post(grade::predict),
        )
        .route("/grade/routes", post(grade::load_routes))
        .route("/grade/select", post(grade::select_box))
        .route("/grade/export", post(grade::export_routes))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
