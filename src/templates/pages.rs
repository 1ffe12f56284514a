use maud::{html, Markup};

use super::components::{
    artist_card, artist_select, delete_button, favorite_button, field_errors, song_table,
    text_field, SongFormValues, SongRowData,
};
use super::layout::base_layout;
use crate::db::entities::artist;
use crate::db::repositories::{ArtistFields, ArtistFilter};
use crate::error::ValidationErrors;

pub fn artist_list_page(
    username: Option<&str>,
    artists: &[artist::Model],
    filter: &ArtistFilter,
) -> Markup {
    base_layout(
        "Artists",
        username,
        html! {
            div class="flex justify-between items-center mb-6" {
                h1 class="text-3xl font-bold text-gray-900" { "Artists" }
                a href="/artists/new" class="px-4 py-2 bg-primary text-white rounded-md text-sm font-medium" {
                    "New artist"
                }
            }

            form method="get" action="/artists" class="bg-white rounded-lg shadow-sm p-4 mb-6" {
                div class="grid grid-cols-1 md:grid-cols-3 gap-4 items-end" {
                    div {
                        label for="name" class="block text-sm font-medium text-gray-700 mb-2" {
                            "Name starts with"
                        }
                        input type="text" id="name" name="name"
                              value=(filter.name.as_deref().unwrap_or(""))
                              class="w-full px-3 py-2 border border-gray-300 rounded-md";
                    }
                    div {
                        label for="nationality" class="block text-sm font-medium text-gray-700 mb-2" {
                            "Nationality"
                        }
                        input type="text" id="nationality" name="nationality"
                              value=(filter.nationality.as_deref().unwrap_or(""))
                              class="w-full px-3 py-2 border border-gray-300 rounded-md";
                    }
                    div {
                        button type="submit" class="px-4 py-2 bg-gray-800 text-white rounded-md text-sm" {
                            "Filter"
                        }
                    }
                }
            }

            @if artists.is_empty() {
                div class="text-center py-12" {
                    p class="text-gray-600 text-lg" { "No artists found." }
                }
            } @else {
                div id="artist-grid" class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-6" {
                    @for artist in artists {
                        (artist_card(artist))
                    }
                }
            }
        },
    )
}

pub fn artist_detail_page(
    username: Option<&str>,
    artist: &artist::Model,
    songs: &[SongRowData],
) -> Markup {
    base_layout(
        &artist.name,
        username,
        html! {
            div class="flex flex-col md:flex-row gap-6 mb-8" {
                @if !artist.photo_url.is_empty() {
                    img src=(artist.photo_url) alt=(artist.name) class="w-full md:w-64 rounded-lg shadow-md";
                }
                div class="flex-grow" {
                    h1 class="text-3xl font-bold text-gray-900" { (artist.name) }
                    @if !artist.nationality.is_empty() {
                        p class="text-gray-600 mt-1" { (artist.nationality) }
                    }
                    div class="flex space-x-3 mt-4" {
                        a href={"/artists/" (artist.id) "/edit"}
                          class="px-4 py-2 bg-gray-800 text-white rounded-md text-sm font-medium" {
                            "Edit"
                        }
                        (delete_button(&format!("/artists/{}/delete", artist.id), "Delete artist"))
                    }
                }
            }

            div class="flex justify-between items-center mb-4" {
                h2 class="text-xl font-semibold text-gray-900" { "Songs" }
                a href={"/songs/new?artist_id=" (artist.id)}
                  class="px-4 py-2 bg-primary text-white rounded-md text-sm font-medium" {
                    "Add song"
                }
            }
            (song_table(songs, username.is_some(), false))
        },
    )
}

pub fn artist_form_page(
    username: Option<&str>,
    heading: &str,
    action: &str,
    fields: &ArtistFields,
    errors: &ValidationErrors,
) -> Markup {
    base_layout(
        heading,
        username,
        html! {
            div class="max-w-xl mx-auto bg-white rounded-lg shadow-sm p-6" {
                h1 class="text-2xl font-bold text-gray-900 mb-6" { (heading) }
                form method="post" action=(action) {
                    (text_field("Name", "name", "text", &fields.name, errors))
                    (text_field("Nationality", "nationality", "text", &fields.nationality, errors))
                    (text_field("Photo URL", "photo_url", "url", &fields.photo_url, errors))
                    button type="submit" class="px-4 py-2 bg-primary text-white rounded-md font-medium" {
                        "Save"
                    }
                }
            }
        },
    )
}

pub fn song_list_page(username: Option<&str>, songs: &[SongRowData]) -> Markup {
    base_layout(
        "Songs",
        username,
        html! {
            div class="flex justify-between items-center mb-6" {
                h1 class="text-3xl font-bold text-gray-900" { "Songs" }
                a href="/songs/new" class="px-4 py-2 bg-primary text-white rounded-md text-sm font-medium" {
                    "New song"
                }
            }
            (song_table(songs, username.is_some(), true))
        },
    )
}

pub fn favorites_page(username: Option<&str>, songs: &[SongRowData]) -> Markup {
    base_layout(
        "Favorites",
        username,
        html! {
            h1 class="text-3xl font-bold text-gray-900 mb-6" { "Your favorites" }
            (song_table(songs, true, true))
        },
    )
}

pub fn song_detail_page(username: Option<&str>, song: &SongRowData, favorite_count: u64) -> Markup {
    base_layout(
        &song.title,
        username,
        html! {
            div class="bg-white rounded-lg shadow-sm p-6" {
                h1 class="text-3xl font-bold text-gray-900" { (song.title) }
                dl class="space-y-4 mt-6" {
                    div {
                        dt class="text-sm font-medium text-gray-500" { "Artist" }
                        dd class="mt-1 text-lg" {
                            a href={"/artists/" (song.artist_id)} class="hover:underline" { (song.artist_name) }
                        }
                    }
                    @if !song.album.is_empty() {
                        div {
                            dt class="text-sm font-medium text-gray-500" { "Album" }
                            dd class="mt-1 text-gray-900" { (song.album) }
                        }
                    }
                    div {
                        dt class="text-sm font-medium text-gray-500" { "Favorited by" }
                        dd class="mt-1 text-gray-900" {
                            (favorite_count) @if favorite_count == 1 { " listener" } @else { " listeners" }
                        }
                    }
                }

                @if let Some(url) = &song.preview_url {
                    audio controls src=(url) class="mt-6 w-full" {}
                }

                div class="flex items-center space-x-3 mt-6" {
                    (favorite_button(song.id, song.favorited, username.is_some()))
                    a href={"/songs/" (song.id) "/edit"}
                      class="px-4 py-2 bg-gray-800 text-white rounded-md text-sm font-medium" {
                        "Edit"
                    }
                    (delete_button(&format!("/songs/{}/delete", song.id), "Delete song"))
                }
            }
        },
    )
}

pub fn song_form_page(
    username: Option<&str>,
    heading: &str,
    action: &str,
    values: &SongFormValues,
    artists: &[artist::Model],
    errors: &ValidationErrors,
) -> Markup {
    base_layout(
        heading,
        username,
        html! {
            div class="max-w-xl mx-auto bg-white rounded-lg shadow-sm p-6" {
                h1 class="text-2xl font-bold text-gray-900 mb-6" { (heading) }
                form method="post" action=(action) {
                    (artist_select(artists, &values.artist_id, errors))
                    (text_field("Title", "title", "text", &values.title, errors))
                    (text_field("Album", "album", "text", &values.album, errors))
                    (text_field("Preview URL", "preview_url", "url", &values.preview_url, errors))
                    button type="submit" class="px-4 py-2 bg-primary text-white rounded-md font-medium" {
                        "Save"
                    }
                }
            }
        },
    )
}

pub fn login_page(username_value: &str, error: Option<&str>) -> Markup {
    base_layout(
        "Log in",
        None,
        html! {
            div class="max-w-md mx-auto bg-white rounded-lg shadow-sm p-6" {
                h1 class="text-2xl font-bold text-gray-900 mb-6" { "Log in" }
                @if let Some(message) = error {
                    div class="mb-4 p-3 rounded-md bg-red-50 text-red-700 text-sm" { (message) }
                }
                form method="post" action="/login" {
                    (text_field("Username", "username", "text", username_value, &ValidationErrors::new()))
                    (text_field("Password", "password", "password", "", &ValidationErrors::new()))
                    button type="submit" class="w-full px-4 py-2 bg-primary text-white rounded-md font-medium" {
                        "Log in"
                    }
                }
                p class="mt-4 text-sm text-gray-600" {
                    "No account yet? " a href="/signup" class="text-primary hover:underline" { "Sign up" }
                }
            }
        },
    )
}

pub fn signup_page(username_value: &str, errors: &ValidationErrors) -> Markup {
    base_layout(
        "Sign up",
        None,
        html! {
            div class="max-w-md mx-auto bg-white rounded-lg shadow-sm p-6" {
                h1 class="text-2xl font-bold text-gray-900 mb-6" { "Sign up" }
                form method="post" action="/signup" {
                    (text_field("Username", "username", "text", username_value, errors))
                    (text_field("Password", "password", "password", "", errors))
                    (field_errors(errors, "__all__"))
                    button type="submit" class="w-full px-4 py-2 bg-primary text-white rounded-md font-medium" {
                        "Create account"
                    }
                }
            }
        },
    )
}

pub fn error_page(username: Option<&str>, status: u16, message: &str) -> Markup {
    base_layout(
        "Error",
        username,
        html! {
            div class="text-center py-12" {
                p class="text-5xl font-bold text-gray-300" { (status) }
                p class="text-gray-700 text-lg mt-4" { (message) }
                a href="/artists" class="text-primary hover:underline mt-6 inline-block" { "Back to artists" }
            }
        },
    )
}
