use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::signup,
        api::auth::login,
        api::auth::get_me,
        api::posts::create_post,
        api::posts::list_posts,
        api::posts::list_user_posts,
        api::posts::search_posts,
        api::posts::delete_post,
        api::engagement::toggle_like,
        api::engagement::like_status,
        api::engagement::toggle_share,
        api::engagement::share_status,
        api::engagement::add_comment,
        api::engagement::list_comments,
        api::follow::follow,
        api::follow::check_follow,
        api::follow::list_followers,
        api::follow::list_following,
        api::users::search_users,
        api::users::search_followers,
        api::users::search_mutual_followers,
        api::users::suggested_users,
        api::users::get_user,
        api::profile::get_profile,
        api::profile::update_profile,
        api::messages::start_conversation,
        api::messages::send_message,
        api::messages::read_conversation,
        api::messages::list_conversations,
        api::messages::unread_count,
        api::grade::predict,
        api::grade::prediction_health,
        api::grade::load_routes,
        api::grade::select_box,
        api::grade::export_routes,
    ),
    tags(
        (name = "climbtime", description = "ClimbTime API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/me",
            "/api/posts/{post_id}",
            "/api/posts/share",
            "/api/follow/check",
            "/api/users/{user_id}/following",
            "/api/messages/{conversation_id}",
            "/api/messages/unread/count",
            "/api/grade/export",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
