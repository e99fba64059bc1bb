//! Paged iterators over server-side album and track lists.
//!
//! Pages are requested lazily as the caller drains the buffer. A page
//! shorter than the page size ends the sequence. Album filtering happens
//! here, on the client, so results never depend on what the server can
//! filter natively.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;

use super::adapter;
use super::api::SubsonicApi;
use super::dto::{AlbumListType, SearchPaging};
use crate::error::Result;
use crate::model::{Album, AlbumFilter, Track};
use crate::provider::{AlbumIterator, AlbumSortOrder, PrefetchCallback, TrackIterator};

/// Widest year range the server accepts for `byYear`
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// The `getAlbumList2` list type that produces `order`.
pub fn list_type_for(order: AlbumSortOrder) -> AlbumListType {
    match order {
        AlbumSortOrder::RecentlyAdded => AlbumListType::Newest,
        AlbumSortOrder::RecentlyPlayed => AlbumListType::Recent,
        AlbumSortOrder::FrequentlyPlayed => AlbumListType::Frequent,
        AlbumSortOrder::Random => AlbumListType::Random,
        AlbumSortOrder::TitleAZ => AlbumListType::AlphabeticalByName,
        AlbumSortOrder::ArtistAZ => AlbumListType::AlphabeticalByArtist,
        AlbumSortOrder::YearAscending => AlbumListType::ByYear {
            from: MIN_YEAR,
            to: MAX_YEAR,
        },
        AlbumSortOrder::YearDescending => AlbumListType::ByYear {
            from: MAX_YEAR,
            to: MIN_YEAR,
        },
    }
}

enum AlbumSource {
    List(AlbumListType),
    Search(String),
}

/// Albums from `getAlbumList2` or `search3`, filtered client-side.
pub struct AlbumPager<'a, A> {
    api: &'a A,
    source: AlbumSource,
    filter: AlbumFilter,
    page_size: u32,
    offset: u32,
    buffer: VecDeque<Album>,
    /// Random lists may repeat albums across pages
    seen: HashSet<String>,
    exhausted: bool,
    prefetch: Option<PrefetchCallback>,
}

impl<'a, A: SubsonicApi> AlbumPager<'a, A> {
    pub fn list(
        api: &'a A,
        list: AlbumListType,
        filter: AlbumFilter,
        page_size: u32,
        prefetch: Option<PrefetchCallback>,
    ) -> Self {
        Self::new(api, AlbumSource::List(list), filter, page_size, prefetch)
    }

    pub fn search(
        api: &'a A,
        query: &str,
        filter: AlbumFilter,
        page_size: u32,
        prefetch: Option<PrefetchCallback>,
    ) -> Self {
        let source = AlbumSource::Search(query.to_string());
        Self::new(api, source, filter, page_size, prefetch)
    }

    fn new(
        api: &'a A,
        source: AlbumSource,
        filter: AlbumFilter,
        page_size: u32,
        prefetch: Option<PrefetchCallback>,
    ) -> Self {
        Self {
            api,
            source,
            filter,
            page_size: page_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            exhausted: false,
            prefetch,
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let page = match &self.source {
            AlbumSource::List(list) => {
                self.api
                    .get_album_list2(*list, self.page_size, self.offset)
                    .await?
            }
            AlbumSource::Search(query) => {
                let paging = SearchPaging::albums(self.page_size, self.offset);
                self.api.search3(query, paging).await?.album
            }
        };
        tracing::debug!(offset = self.offset, count = page.len(), "Fetched album page");

        if page.len() < self.page_size as usize {
            self.exhausted = true;
        }
        self.offset += self.page_size;

        let mut fresh = 0usize;
        for album in page {
            if !self.seen.insert(album.id.clone()) {
                continue;
            }
            fresh += 1;
            let album = adapter::to_album(album);
            if self.filter.matches(Some(&album)) {
                self.buffer.push_back(album);
            }
        }
        if fresh == 0 {
            self.exhausted = true;
        }
        Ok(())
    }
}

#[async_trait]
impl<'a, A: SubsonicApi> AlbumIterator for AlbumPager<'a, A> {
    async fn next(&mut self) -> Result<Option<Album>> {
        while self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }
        let Some(album) = self.buffer.pop_front() else {
            return Ok(None);
        };
        if let Some(prefetch) = &self.prefetch
            && !album.cover_art_id.is_empty()
        {
            prefetch(&album.cover_art_id);
        }
        Ok(Some(album))
    }
}

/// Tracks from `search3`. An empty query walks the whole library.
pub struct TrackPager<'a, A> {
    api: &'a A,
    query: String,
    page_size: u32,
    offset: u32,
    buffer: VecDeque<Track>,
    exhausted: bool,
}

impl<'a, A: SubsonicApi> TrackPager<'a, A> {
    pub fn new(api: &'a A, query: &str, page_size: u32) -> Self {
        Self {
            api,
            query: query.to_string(),
            page_size: page_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

#[async_trait]
impl<'a, A: SubsonicApi> TrackIterator for TrackPager<'a, A> {
    async fn next(&mut self) -> Result<Option<Track>> {
        if self.buffer.is_empty() && !self.exhausted {
            let paging = SearchPaging::songs(self.page_size, self.offset);
            let page = self.api.search3(&self.query, paging).await?.song;
            tracing::debug!(offset = self.offset, count = page.len(), "Fetched track page");

            self.exhausted = page.len() < self.page_size as usize;
            self.offset += self.page_size;
            self.buffer.extend(page.into_iter().map(adapter::to_track));
        }
        Ok(self.buffer.pop_front())
    }
}
