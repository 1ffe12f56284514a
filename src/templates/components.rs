use maud::{html, Markup};
use serde::Deserialize;

use crate::db::entities::{artist, song};
use crate::error::ValidationErrors;

/// A song as shown in lists and detail views.
pub struct SongRowData {
    pub id: i32,
    pub title: String,
    pub album: String,
    pub preview_url: Option<String>,
    pub artist_id: i32,
    pub artist_name: String,
    pub favorited: bool,
}

/// Raw song form input. Kept as strings so a bad artist choice can be
/// re-displayed alongside the other field errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFormValues {
    #[serde(default)]
    pub artist_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub preview_url: String,
}

impl From<&song::Model> for SongFormValues {
    fn from(song: &song::Model) -> Self {
        Self {
            artist_id: song.artist_id.to_string(),
            title: song.title.clone(),
            album: song.album.clone(),
            preview_url: song.preview_url.clone().unwrap_or_default(),
        }
    }
}

const PLACEHOLDER_PHOTO: &str = "https://via.placeholder.com/300x300/1a1a1a/ffffff?text=No+Photo";

pub fn artist_card(artist: &artist::Model) -> Markup {
    let photo = if artist.photo_url.is_empty() {
        PLACEHOLDER_PHOTO
    } else {
        artist.photo_url.as_str()
    };

    html! {
        a href={"/artists/" (artist.id)}
          class="artist-card block bg-white rounded-lg shadow-md overflow-hidden hover:shadow-lg" {
            div class="aspect-square" {
                img src=(photo) alt=(artist.name) class="w-full h-full object-cover" loading="lazy";
            }
            div class="p-4" {
                h3 class="font-semibold text-gray-900 truncate" title=(artist.name) {
                    (artist.name)
                }
                @if !artist.nationality.is_empty() {
                    p class="text-sm text-gray-600" { (artist.nationality) }
                }
            }
        }
    }
}

/// Heart toggle. Anonymous visitors get a link to the login page instead.
pub fn favorite_button(song_id: i32, favorited: bool, authenticated: bool) -> Markup {
    if !authenticated {
        return html! {
            a href="/login" class="favorite-button text-sm text-gray-500 hover:text-red-500" {
                "♡ Log in to favorite"
            }
        };
    }

    let (action, label, class) = if favorited {
        ("unfavorite", "♥ Favorited", "text-red-600")
    } else {
        ("favorite", "♡ Favorite", "text-gray-500 hover:text-red-500")
    };
    let favorited_attr = if favorited { "true" } else { "false" };

    html! {
        form method="post"
             action={"/songs/" (song_id) "/" (action)}
             hx-post={"/songs/" (song_id) "/" (action)}
             hx-swap="outerHTML"
             class="favorite-button inline" {
            button type="submit" class={"text-sm font-medium " (class)} data-favorited=(favorited_attr) {
                (label)
            }
        }
    }
}

pub fn song_row(song: &SongRowData, authenticated: bool, show_artist: bool) -> Markup {
    html! {
        tr class="border-b" {
            td class="py-3 px-4" {
                a href={"/songs/" (song.id)} class="font-medium text-gray-900 hover:underline" {
                    (song.title)
                }
            }
            @if show_artist {
                td class="py-3 px-4" {
                    a href={"/artists/" (song.artist_id)} class="text-gray-700 hover:underline" {
                        (song.artist_name)
                    }
                }
            }
            td class="py-3 px-4 text-gray-600" { (song.album) }
            td class="py-3 px-4 text-right" {
                (favorite_button(song.id, song.favorited, authenticated))
            }
        }
    }
}

pub fn song_table(songs: &[SongRowData], authenticated: bool, show_artist: bool) -> Markup {
    html! {
        @if songs.is_empty() {
            p class="text-gray-600 py-6" { "No songs yet." }
        } @else {
            table class="w-full bg-white rounded-lg shadow-sm" {
                thead {
                    tr class="text-left text-sm text-gray-500 border-b" {
                        th class="py-2 px-4" { "Title" }
                        @if show_artist {
                            th class="py-2 px-4" { "Artist" }
                        }
                        th class="py-2 px-4" { "Album" }
                        th class="py-2 px-4" {}
                    }
                }
                tbody {
                    @for song in songs {
                        (song_row(song, authenticated, show_artist))
                    }
                }
            }
        }
    }
}

pub fn field_errors(errors: &ValidationErrors, field: &str) -> Markup {
    html! {
        @if let Some(messages) = errors.field(field) {
            ul class="errorlist mt-1 text-sm text-red-600" {
                @for message in messages {
                    li { (message) }
                }
            }
        }
    }
}

pub fn text_field(
    label: &str,
    name: &str,
    input_type: &str,
    value: &str,
    errors: &ValidationErrors,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(name) class="block text-sm font-medium text-gray-700 mb-2" { (label) }
            input
                type=(input_type)
                id=(name)
                name=(name)
                value=(value)
                class="w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-primary";
            (field_errors(errors, name))
        }
    }
}

pub fn artist_select(
    artists: &[artist::Model],
    selected: &str,
    errors: &ValidationErrors,
) -> Markup {
    html! {
        div class="mb-4" {
            label for="artist_id" class="block text-sm font-medium text-gray-700 mb-2" { "Artist" }
            select id="artist_id" name="artist_id"
                   class="w-full px-3 py-2 border border-gray-300 rounded-md" {
                option value="" { "---------" }
                @for artist in artists {
                    @let value = artist.id.to_string();
                    option value=(value) selected[value == selected] { (artist.name) }
                }
            }
            (field_errors(errors, "artist_id"))
        }
    }
}

pub fn delete_button(action: &str, label: &str) -> Markup {
    html! {
        form method="post" action=(action) class="inline"
             onsubmit="return confirm('Are you sure?')" {
            button type="submit" class="px-4 py-2 bg-red-600 text-white rounded-md text-sm font-medium" {
                (label)
            }
        }
    }
}
