use mockito::{Matcher, Server};
use rustflix_core::ContentType;
use rustflix_metadata::{ContentProvider, MetadataError, TmdbClient};
use serde_json::json;

fn client(server: &Server) -> TmdbClient {
    TmdbClient::with_base_url("test-key".to_string(), server.url())
}

#[tokio::test]
async fn movie_is_reshaped_into_a_descriptor() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/603")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("append_to_response".into(), "videos".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 603,
                "title": "The Matrix",
                "overview": "Welcome to the real world.",
                "videos": { "results": [ { "site": "YouTube", "type": "Trailer", "key": "abc" } ] }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let movie = client(&server)
        .fetch_media("603", ContentType::Movie)
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(movie.title, "The Matrix");
    assert!(!movie.is_tv_show());
    assert_eq!(
        movie.trailer_url.as_deref(),
        Some("https://www.youtube.com/watch?v=abc")
    );
}

#[tokio::test]
async fn show_fetches_regular_seasons_and_drops_failed_ones() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/tv/1399")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "Long Show",
                "overview": "Many seasons.",
                "seasons": [
                    { "season_number": 0 },
                    { "season_number": 1 },
                    { "season_number": 2 },
                    { "season_number": 3 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let specials = server
        .mock("GET", "/tv/1399/season/0")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    server
        .mock("GET", "/tv/1399/season/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({ "episodes": [ { "episode_number": 1, "name": "Winter" }, { "episode_number": 2 } ] })
                .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/tv/1399/season/2")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", "/tv/1399/season/3")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "episodes": [ { "episode_number": 1 } ] }).to_string())
        .create_async()
        .await;

    let show = client(&server)
        .fetch_media("1399", ContentType::Tv)
        .await
        .unwrap()
        .unwrap();

    specials.assert_async().await;
    assert!(show.is_tv_show());
    assert_eq!(show.title, "Long Show");
    assert_eq!(show.season_numbers(), vec![1, 3]);
    assert_eq!(show.season(1).unwrap().episodes.len(), 2);
    assert_eq!(show.season(1).unwrap().episode(1).unwrap().name, "Winter");
    assert!(show.season(2).is_none());
}

#[tokio::test]
async fn unknown_id_is_a_miss_not_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/movie/0")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let result = client(&server).fetch_media("0", ContentType::Movie).await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn server_errors_propagate() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/tv/5")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let result = client(&server).fetch_media("5", ContentType::Tv).await;
    assert!(matches!(result, Err(MetadataError::Provider(_))));
}
