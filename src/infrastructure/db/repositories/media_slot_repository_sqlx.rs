use anyhow::bail;
use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::domain::media::{MediaSlot, SlotKind, SlotOwner};
use crate::infrastructure::db::PgPool;

/// Media slots are columns on the owning tables; this adapter maps
/// (owner, kind) to the table and column that hold the path.
pub struct SqlxMediaSlotRepository {
    pub pool: PgPool,
}

impl SqlxMediaSlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn owner_table(owner: SlotOwner) -> &'static str {
    match owner {
        SlotOwner::User(_) => "users",
        SlotOwner::Track(_) => "tracks",
        SlotOwner::Publication(_) => "publications",
    }
}

/// Column holding `kind` for `owner`, and whether it accepts NULL.
fn slot_column(owner: SlotOwner, kind: SlotKind) -> Option<(&'static str, bool)> {
    match (owner, kind) {
        (SlotOwner::User(_), SlotKind::Avatar) => Some(("profile_picture", true)),
        (SlotOwner::User(_), SlotKind::Header) => Some(("header_image", true)),
        (SlotOwner::Track(_), SlotKind::Audio) => Some(("audio_file", false)),
        (SlotOwner::Publication(_), SlotKind::Audio) => Some(("audio_file", false)),
        (SlotOwner::Publication(_), SlotKind::Cover) => Some(("cover_image", true)),
        _ => None,
    }
}

impl SqlxMediaSlotRepository {
    async fn user_slots(&self, id: Uuid) -> anyhow::Result<Vec<MediaSlot>> {
        let owner = SlotOwner::User(id);
        let Some(row) =
            sqlx::query("SELECT profile_picture, header_image FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(Vec::new());
        };
        let mut out = vec![
            MediaSlot::new(owner, SlotKind::Avatar, row.get("profile_picture")),
            MediaSlot::new(owner, SlotKind::Header, row.get("header_image")),
        ];

        // Tracks and publications cascade with the user row.
        let tracks = sqlx::query("SELECT id, audio_file FROM tracks WHERE user_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        out.extend(tracks.iter().map(|r| {
            MediaSlot::new(
                SlotOwner::Track(r.get("id")),
                SlotKind::Audio,
                Some(r.get("audio_file")),
            )
        }));
        let pubs =
            sqlx::query("SELECT id, audio_file, cover_image FROM publications WHERE user_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        for r in &pubs {
            let owner = SlotOwner::Publication(r.get("id"));
            out.push(MediaSlot::new(owner, SlotKind::Audio, Some(r.get("audio_file"))));
            out.push(MediaSlot::new(owner, SlotKind::Cover, r.get("cover_image")));
        }
        Ok(out)
    }
}

#[async_trait]
impl MediaSlotRepository for SqlxMediaSlotRepository {
    async fn list_slots(&self, owner: SlotOwner) -> anyhow::Result<Vec<MediaSlot>> {
        match owner {
            SlotOwner::User(id) => self.user_slots(id).await,
            SlotOwner::Track(id) => {
                let row = sqlx::query("SELECT audio_file FROM tracks WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row
                    .map(|r| vec![MediaSlot::new(owner, SlotKind::Audio, Some(r.get("audio_file")))])
                    .unwrap_or_default())
            }
            SlotOwner::Publication(id) => {
                let row =
                    sqlx::query("SELECT audio_file, cover_image FROM publications WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;
                Ok(row
                    .map(|r| {
                        vec![
                            MediaSlot::new(owner, SlotKind::Audio, Some(r.get("audio_file"))),
                            MediaSlot::new(owner, SlotKind::Cover, r.get("cover_image")),
                        ]
                    })
                    .unwrap_or_default())
            }
        }
    }

    async fn save_slot(&self, slot: &MediaSlot) -> anyhow::Result<bool> {
        let Some((column, nullable)) = slot_column(slot.owner, slot.kind) else {
            bail!("{} has no {} slot", slot.owner, slot.kind);
        };
        if slot.current_path.is_none() && !nullable {
            bail!("{} slot of {} cannot be cleared", slot.kind, slot.owner);
        }
        let sql = format!(
            "UPDATE {} SET {column} = $2 WHERE id = $1",
            owner_table(slot.owner)
        );
        let res = sqlx::query(&sql)
            .bind(slot.owner.id())
            .bind(slot.current_path.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owner(&self, owner: SlotOwner) -> anyhow::Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", owner_table(owner));
        let res = sqlx::query(&sql)
            .bind(owner.id())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn is_path_referenced(&self, path: &str) -> anyhow::Result<bool> {
        let row = sqlx::query(
            r#"SELECT
                 EXISTS (SELECT 1 FROM users WHERE profile_picture = $1 OR header_image = $1)
              OR EXISTS (SELECT 1 FROM tracks WHERE audio_file = $1)
              OR EXISTS (SELECT 1 FROM publications WHERE audio_file = $1 OR cover_image = $1)
              AS referenced"#,
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("referenced"))
    }
}
