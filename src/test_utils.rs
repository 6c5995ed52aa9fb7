//! In-memory fakes for the application ports, used by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::email_sender::EmailSender;
use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::password_reset_repository::{
    PasswordResetRepository, ResetTokenRow,
};
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::ports::publication_repository::{NewPublication, PublicationRepository};
use crate::application::ports::track_repository::TrackRepository;
use crate::application::ports::user_repository::{NewUser, ProfileFields, UserRepository};
use crate::domain::media::{MediaSlot, SlotKind, SlotOwner};
use crate::domain::projects::project::{Project, ProjectSummary};
use crate::domain::publications::publication::Publication;
use crate::domain::tracks::track::Track;
use crate::domain::users::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Put(String),
    Deleted(String),
    Saved(SlotOwner, SlotKind, Option<String>),
    OwnerDeleted(SlotOwner),
}

/// Ordered record of side effects shared between a store and a repository.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

pub fn event_log() -> EventLog {
    EventLog::default()
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    delete_attempts: Mutex<HashMap<String, usize>>,
    puts: AtomicUsize,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    log: EventLog,
}

impl MemoryStore {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(path.to_string(), bytes);
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self, path: &str) -> usize {
        self.delete_attempts
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> anyhow::Result<String> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(anyhow!("store unavailable"));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.insert(path, bytes.to_vec());
        self.log.push(Event::Put(path.to_string()));
        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<bool> {
        *self
            .delete_attempts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default() += 1;
        self.log.push(Event::Deleted(path.to_string()));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(anyhow!("delete refused"));
        }
        Ok(self.objects.lock().unwrap().remove(path).is_some())
    }

    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.object(path))
    }
}

/// Slot table keyed by owner and kind, independent of any record type.
#[derive(Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<(SlotOwner, SlotKind), Option<String>>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    log: EventLog,
}

impl MemorySlots {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn insert(&self, slot: &MediaSlot) {
        self.slots
            .lock()
            .unwrap()
            .insert((slot.owner, slot.kind), slot.current_path.clone());
    }

    pub fn path_of(&self, owner: SlotOwner, kind: SlotKind) -> Option<String> {
        self.slots
            .lock()
            .unwrap()
            .get(&(owner, kind))
            .cloned()
            .flatten()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSlotRepository for MemorySlots {
    async fn list_slots(&self, owner: SlotOwner) -> anyhow::Result<Vec<MediaSlot>> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|((o, _), _)| *o == owner)
            .map(|((o, k), path)| MediaSlot::new(*o, *k, path.clone()))
            .collect())
    }

    async fn save_slot(&self, slot: &MediaSlot) -> anyhow::Result<bool> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(anyhow!("database unavailable"));
        }
        let mut slots = self.slots.lock().unwrap();
        if !slots.keys().any(|(o, _)| *o == slot.owner) {
            return Ok(false);
        }
        slots.insert((slot.owner, slot.kind), slot.current_path.clone());
        self.log.push(Event::Saved(
            slot.owner,
            slot.kind,
            slot.current_path.clone(),
        ));
        Ok(true)
    }

    async fn delete_owner(&self, owner: SlotOwner) -> anyhow::Result<bool> {
        let mut slots = self.slots.lock().unwrap();
        let before = slots.len();
        slots.retain(|(o, _), _| *o != owner);
        if slots.len() == before {
            return Ok(false);
        }
        self.log.push(Event::OwnerDeleted(owner));
        Ok(true)
    }

    async fn is_path_referenced(&self, path: &str) -> anyhow::Result<bool> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .values()
            .any(|p| p.as_deref() == Some(path)))
    }
}

struct UserRow {
    user: User,
    password_hash: String,
}

struct ResetRow {
    row: ResetTokenRow,
    token_hash: String,
}

#[derive(Default)]
struct DbState {
    users: HashMap<Uuid, UserRow>,
    tracks: HashMap<Uuid, Track>,
    projects: HashMap<Uuid, Project>,
    publications: HashMap<Uuid, Publication>,
    resets: Vec<ResetRow>,
}

impl DbState {
    /// Publications carry author fields joined from users on read.
    fn joined(&self, p: &Publication) -> Publication {
        let mut p = p.clone();
        if let Some(row) = self.users.get(&p.user_id) {
            p.username = row.user.username.clone();
            p.author_picture = row.user.profile_picture.clone();
        }
        p
    }

    fn slots_of(&self, owner: SlotOwner) -> Vec<MediaSlot> {
        match owner {
            SlotOwner::User(id) => {
                let Some(row) = self.users.get(&id) else {
                    return Vec::new();
                };
                let mut out = vec![
                    MediaSlot::new(owner, SlotKind::Avatar, row.user.profile_picture.clone()),
                    MediaSlot::new(owner, SlotKind::Header, row.user.header_image.clone()),
                ];
                for t in self.tracks.values().filter(|t| t.user_id == id) {
                    out.extend(self.slots_of(SlotOwner::Track(t.id)));
                }
                for p in self.publications.values().filter(|p| p.user_id == id) {
                    out.extend(self.slots_of(SlotOwner::Publication(p.id)));
                }
                out
            }
            SlotOwner::Track(id) => self
                .tracks
                .get(&id)
                .map(|t| vec![MediaSlot::new(owner, SlotKind::Audio, Some(t.audio_file.clone()))])
                .unwrap_or_default(),
            SlotOwner::Publication(id) => self
                .publications
                .get(&id)
                .map(|p| {
                    vec![
                        MediaSlot::new(owner, SlotKind::Audio, Some(p.audio_file.clone())),
                        MediaSlot::new(owner, SlotKind::Cover, p.cover_image.clone()),
                    ]
                })
                .unwrap_or_default(),
        }
    }
}

/// One fake standing in for every database-backed repository, so that
/// cascades and cross-table reference checks behave like Postgres.
#[derive(Default)]
pub struct MemoryDb {
    state: Mutex<DbState>,
    fail_writes: AtomicBool,
}

impl MemoryDb {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("database is read-only"));
        }
        Ok(())
    }

    pub fn seed_user(&self, username: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            is_listener: true,
            is_creator: false,
            bio: String::new(),
            profile_picture: None,
            header_image: None,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: "!".into(),
            },
        );
        user
    }

    pub fn set_user_media(&self, id: Uuid, avatar: Option<&str>, header: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.users.get_mut(&id) {
            row.user.profile_picture = avatar.map(str::to_string);
            row.user.header_image = header.map(str::to_string);
        }
    }

    pub fn seed_track(&self, user_id: Uuid, title: &str, audio: &str) -> Track {
        let track = Track {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            audio_file: audio.to_string(),
            uploaded_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .tracks
            .insert(track.id, track.clone());
        track
    }

    pub fn seed_publication(
        &self,
        user_id: Uuid,
        title: &str,
        audio: &str,
        cover: Option<&str>,
    ) -> Publication {
        let mut state = self.state.lock().unwrap();
        let p = Publication {
            id: Uuid::new_v4(),
            user_id,
            project_id: None,
            title: title.to_string(),
            description: String::new(),
            audio_file: audio.to_string(),
            cover_image: cover.map(str::to_string),
            is_public: true,
            play_count: 0,
            published_at: Utc::now(),
            username: String::new(),
            author_picture: None,
        };
        let p = state.joined(&p);
        state.publications.insert(p.id, p.clone());
        p
    }

    pub fn seed_reset_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) {
        self.state.lock().unwrap().resets.push(ResetRow {
            row: ResetTokenRow {
                id: Uuid::new_v4(),
                user_id,
                expires_at,
                used_at: None,
            },
            token_hash: token_hash.to_string(),
        });
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&id)
            .map(|r| r.user.clone())
    }

    pub fn password_hash_of(&self, id: Uuid) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&id)
            .map(|r| r.password_hash.clone())
    }

    pub fn track(&self, id: Uuid) -> Option<Track> {
        self.state.lock().unwrap().tracks.get(&id).cloned()
    }

    pub fn track_count(&self) -> usize {
        self.state.lock().unwrap().tracks.len()
    }

    pub fn reset_token(&self, token_hash: &str) -> Option<ResetTokenRow> {
        self.state
            .lock()
            .unwrap()
            .resets
            .iter()
            .find(|r| r.token_hash == token_hash)
            .map(|r| r.row.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn create_user(&self, new_user: NewUser<'_>) -> anyhow::Result<User> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|r| {
                r.user.username == new_user.username
                    || r.user.email.eq_ignore_ascii_case(new_user.email)
            })
        {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.to_string(),
            email: new_user.email.to_string(),
            is_listener: new_user.is_listener,
            is_creator: new_user.is_creator,
            bio: String::new(),
            profile_picture: None,
            header_image: None,
            created_at: Utc::now(),
        };
        state.users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: new_user.password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|r| r.user.username == username)
            .map(|r| r.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .map(|r| r.user.clone()))
    }

    async fn password_hash(&self, id: Uuid) -> anyhow::Result<Option<String>> {
        Ok(self.password_hash_of(id))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<User>> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(bio) = &fields.bio {
            row.user.bio = bio.clone();
        }
        row.user.is_listener = fields.is_listener;
        row.user.is_creator = fields.is_creator;
        row.user.profile_picture = fields.profile_picture.clone();
        row.user.header_image = fields.header_image.clone();
        Ok(Some(row.user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.users.get_mut(&id) else {
            return Ok(false);
        };
        row.password_hash = password_hash.to_string();
        Ok(true)
    }
}

#[async_trait]
impl MediaSlotRepository for MemoryDb {
    async fn list_slots(&self, owner: SlotOwner) -> anyhow::Result<Vec<MediaSlot>> {
        Ok(self.state.lock().unwrap().slots_of(owner))
    }

    async fn save_slot(&self, slot: &MediaSlot) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let path = slot.current_path.clone();
        match (slot.owner, slot.kind) {
            (SlotOwner::User(id), SlotKind::Avatar) => Ok(state
                .users
                .get_mut(&id)
                .map(|r| r.user.profile_picture = path)
                .is_some()),
            (SlotOwner::User(id), SlotKind::Header) => Ok(state
                .users
                .get_mut(&id)
                .map(|r| r.user.header_image = path)
                .is_some()),
            (SlotOwner::Track(id), SlotKind::Audio) => {
                let path = path.ok_or_else(|| anyhow!("track audio cannot be cleared"))?;
                Ok(state
                    .tracks
                    .get_mut(&id)
                    .map(|t| t.audio_file = path)
                    .is_some())
            }
            (SlotOwner::Publication(id), SlotKind::Audio) => {
                let path = path.ok_or_else(|| anyhow!("publication audio cannot be cleared"))?;
                Ok(state
                    .publications
                    .get_mut(&id)
                    .map(|p| p.audio_file = path)
                    .is_some())
            }
            (SlotOwner::Publication(id), SlotKind::Cover) => Ok(state
                .publications
                .get_mut(&id)
                .map(|p| p.cover_image = path)
                .is_some()),
            (owner, kind) => Err(anyhow!("{owner} has no {kind} slot")),
        }
    }

    async fn delete_owner(&self, owner: SlotOwner) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        Ok(match owner {
            SlotOwner::User(id) => {
                let found = state.users.remove(&id).is_some();
                state.tracks.retain(|_, t| t.user_id != id);
                state.projects.retain(|_, p| p.user_id != id);
                state.publications.retain(|_, p| p.user_id != id);
                state.resets.retain(|r| r.row.user_id != id);
                found
            }
            SlotOwner::Track(id) => state.tracks.remove(&id).is_some(),
            SlotOwner::Publication(id) => state.publications.remove(&id).is_some(),
        })
    }

    async fn is_path_referenced(&self, path: &str) -> anyhow::Result<bool> {
        let state = self.state.lock().unwrap();
        let path = Some(path);
        Ok(state.users.values().any(|r| {
            r.user.profile_picture.as_deref() == path || r.user.header_image.as_deref() == path
        }) || state
            .tracks
            .values()
            .any(|t| Some(t.audio_file.as_str()) == path)
            || state.publications.values().any(|p| {
                Some(p.audio_file.as_str()) == path || p.cover_image.as_deref() == path
            }))
    }
}

#[async_trait]
impl TrackRepository for MemoryDb {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Track>> {
        let mut out: Vec<Track> = self
            .state
            .lock()
            .unwrap()
            .tracks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(out)
    }

    async fn insert(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        audio_file: &str,
    ) -> anyhow::Result<Track> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&user_id) {
            return Err(anyhow!("violates foreign key constraint tracks_user_id_fkey"));
        }
        let track = Track {
            id,
            user_id,
            title: title.to_string(),
            audio_file: audio_file.to_string(),
            uploaded_at: Utc::now(),
        };
        state.tracks.insert(id, track.clone());
        Ok(track)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Track>> {
        Ok(self.track(id).filter(|t| t.user_id == user_id))
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        audio_file: Option<&str>,
    ) -> anyhow::Result<Option<Track>> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let Some(track) = state.tracks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            track.title = title.to_string();
        }
        if let Some(path) = audio_file {
            track.audio_file = path.to_string();
        }
        Ok(Some(track.clone()))
    }
}

#[async_trait]
impl ProjectRepository for MemoryDb {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ProjectSummary>> {
        let mut out: Vec<ProjectSummary> = self
            .state
            .lock()
            .unwrap()
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| ProjectSummary {
                id: p.id,
                name: p.name.clone(),
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn insert(
        &self,
        user_id: Uuid,
        name: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<Project> {
        self.check_writable()?;
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            data: data.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Project>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .projects
            .get(&id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> anyhow::Result<Option<Project>> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let Some(p) = state.projects.get_mut(&id).filter(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            p.name = name.to_string();
        }
        if let Some(data) = data {
            p.data = data.clone();
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if !state
            .projects
            .get(&id)
            .is_some_and(|p| p.user_id == user_id)
        {
            return Ok(false);
        }
        state.projects.remove(&id);
        for p in state.publications.values_mut() {
            if p.project_id == Some(id) {
                p.project_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl PublicationRepository for MemoryDb {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Publication>> {
        let state = self.state.lock().unwrap();
        let mut out: Vec<Publication> = state
            .publications
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| state.joined(p))
            .collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(out)
    }

    async fn insert(&self, new_pub: NewPublication<'_>) -> anyhow::Result<Publication> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&new_pub.user_id) {
            return Err(anyhow!(
                "violates foreign key constraint publications_user_id_fkey"
            ));
        }
        let p = Publication {
            id: new_pub.id,
            user_id: new_pub.user_id,
            project_id: new_pub.project_id,
            title: new_pub.title.to_string(),
            description: new_pub.description.to_string(),
            audio_file: new_pub.audio_file.to_string(),
            cover_image: new_pub.cover_image.map(str::to_string),
            is_public: new_pub.is_public,
            play_count: 0,
            published_at: Utc::now(),
            username: String::new(),
            author_picture: None,
        };
        let p = state.joined(&p);
        state.publications.insert(p.id, p.clone());
        Ok(p)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Publication>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .publications
            .get(&id)
            .filter(|p| p.user_id == user_id)
            .map(|p| state.joined(p)))
    }

    async fn increment_play_count(&self, id: Uuid) -> anyhow::Result<Option<i64>> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        Ok(state
            .publications
            .get_mut(&id)
            .filter(|p| p.is_public)
            .map(|p| {
                p.play_count += 1;
                p.play_count
            }))
    }

    async fn list_public(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Publication>> {
        let state = self.state.lock().unwrap();
        let mut out: Vec<Publication> = state
            .publications
            .values()
            .filter(|p| p.is_public)
            .map(|p| state.joined(p))
            .collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(out
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_public_by_username(&self, username: &str) -> anyhow::Result<Vec<Publication>> {
        let state = self.state.lock().unwrap();
        let mut out: Vec<Publication> = state
            .publications
            .values()
            .map(|p| state.joined(p))
            .filter(|p| p.is_public && p.username == username)
            .collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(out)
    }

    async fn project_belongs_to(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .projects
            .get(&project_id)
            .is_some_and(|p| p.user_id == user_id))
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryDb {
    async fn create_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<Uuid> {
        self.check_writable()?;
        let id = Uuid::new_v4();
        self.state.lock().unwrap().resets.push(ResetRow {
            row: ResetTokenRow {
                id,
                user_id,
                expires_at,
                used_at: None,
            },
            token_hash: token_hash.to_string(),
        });
        Ok(id)
    }

    async fn find_by_hash(&self, token_hash: &str) -> anyhow::Result<Option<ResetTokenRow>> {
        Ok(self.reset_token(token_hash))
    }

    async fn consume(&self, token_id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let Some(reset) = state
            .resets
            .iter_mut()
            .find(|r| r.row.id == token_id && r.row.used_at.is_none())
        else {
            return Ok(false);
        };
        reset.row.used_at = Some(Utc::now());
        let user_id = reset.row.user_id;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        Ok(true)
    }
}

/// Captures password reset mails as `(to, link)` pairs.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_password_reset(
        &self,
        to_email: &str,
        _to_name: Option<&str>,
        reset_link: &str,
    ) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("smtp connection refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), reset_link.to_string()));
        Ok(())
    }
}
