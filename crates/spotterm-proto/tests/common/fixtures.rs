#![allow(dead_code)]

/// `GET /status` body of a daemon playing a two-artist track.
pub const STATUS_PLAYING: &str = r#"{
    "username": "listener",
    "device_id": "abc123",
    "device_type": "computer",
    "device_name": "Spotify CLI",
    "play_origin": "go-librespot",
    "stopped": false,
    "paused": false,
    "buffering": false,
    "volume": 40,
    "volume_steps": 100,
    "repeat_context": true,
    "repeat_track": false,
    "shuffle_context": true,
    "track": {
        "uri": "spotify:track:6rqhFgbbKwnb9MLmUQDhG6",
        "name": "Speak to Me",
        "artist_names": ["Pink Floyd", "Guest"],
        "album_name": "The Dark Side of the Moon",
        "album_cover_url": "https://i.scdn.co/image/x",
        "position": 61000,
        "duration": 90000,
        "release_date": "1973",
        "track_number": 1,
        "disc_number": 1
    }
}"#;

/// `GET /status` body right after the daemon started, before any session.
pub const STATUS_IDLE: &str = r#"{
    "username": "",
    "stopped": true,
    "paused": false,
    "buffering": false,
    "volume": 0,
    "volume_steps": 100,
    "repeat_context": false,
    "repeat_track": false,
    "shuffle_context": false,
    "track": null
}"#;

/// A short `/events` session as the daemon emits it.
pub const EVENT_SESSION: &[&str] = &[
    r#"{"type":"active","data":null}"#,
    r#"{"type":"metadata","data":{"uri":"spotify:track:1","name":"One","artist_names":["A"],"album_name":"X","album_cover_url":"","position":0,"duration":200000}}"#,
    r#"{"type":"playing","data":{"uri":"spotify:track:1","play_origin":"go-librespot"}}"#,
    r#"{"type":"seek","data":{"uri":"spotify:track:1","position":90000,"duration":200000}}"#,
    r#"{"type":"volume","data":{"value":65535,"max":65535}}"#,
    r#"{"type":"repeat_track","data":{"value":true}}"#,
];
