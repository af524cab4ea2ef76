//! Profile storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    parse_datetime, parse_string_list, parse_uuid, parse_video_guides, OptionalExt,
};
use crate::error::Result;
use crate::models::{AreaType, GuestType, PropertyProfile, PropertyType};

const PROFILE_COLUMNS: &str = "id, created_at, property_name, property_type, location, \
     host_name, host_image_url, hero_image_url, additional_photos, video_guides, \
     target_guest, check_in_time, check_out_time, check_in_method, wifi_name, \
     wifi_password, emergency_phone, property_contact, house_rules, parking_info, \
     pet_policy, smoking_policy, quiet_hours, checkout_tasks, area_type, restaurants, \
     activities, special_notes, generated_guide";

fn profile_from_row(row: &Row<'_>) -> std::result::Result<PropertyProfile, rusqlite::Error> {
    Ok(PropertyProfile {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        created_at: parse_datetime(&row.get::<_, String>(1)?)?,
        property_name: row.get(2)?,
        property_type: PropertyType::from_label(&row.get::<_, String>(3)?),
        location: row.get(4)?,
        host_name: row.get(5)?,
        host_image_url: row.get(6)?,
        hero_image_url: row.get(7)?,
        additional_photos: parse_string_list(&row.get::<_, String>(8)?)?,
        video_guides: parse_video_guides(&row.get::<_, String>(9)?)?,
        target_guest: GuestType::from_label(&row.get::<_, String>(10)?),
        check_in_time: row.get(11)?,
        check_out_time: row.get(12)?,
        check_in_method: row.get(13)?,
        wifi_name: row.get(14)?,
        wifi_password: row.get(15)?,
        emergency_phone: row.get(16)?,
        property_contact: row.get(17)?,
        house_rules: parse_string_list(&row.get::<_, String>(18)?)?,
        parking_info: row.get(19)?,
        pet_policy: row.get(20)?,
        smoking_policy: row.get(21)?,
        quiet_hours: row.get(22)?,
        checkout_tasks: row.get(23)?,
        area_type: AreaType::from_label(&row.get::<_, String>(24)?),
        restaurants: row.get(25)?,
        activities: row.get(26)?,
        special_notes: row.get(27)?,
        generated_guide: row.get(28)?,
    })
}

pub struct ProfileStore<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Upsert a whole profile record keyed by id. Last writer wins on
    /// conflicting edits to the same id; there are no partial-field writes.
    #[instrument(skip(self, profile), fields(id = %profile.id))]
    pub fn upsert(&self, profile: &PropertyProfile, owner_id: Uuid) -> Result<()> {
        self.conn.execute(
            "INSERT INTO profiles (
                id, owner_id, created_at, property_name, property_type, location,
                host_name, host_image_url, hero_image_url, additional_photos, video_guides,
                target_guest, check_in_time, check_out_time, check_in_method, wifi_name,
                wifi_password, emergency_phone, property_contact, house_rules, parking_info,
                pet_policy, smoking_policy, quiet_hours, checkout_tasks, area_type,
                restaurants, activities, special_notes, generated_guide
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30
            )
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                property_name = excluded.property_name,
                property_type = excluded.property_type,
                location = excluded.location,
                host_name = excluded.host_name,
                host_image_url = excluded.host_image_url,
                hero_image_url = excluded.hero_image_url,
                additional_photos = excluded.additional_photos,
                video_guides = excluded.video_guides,
                target_guest = excluded.target_guest,
                check_in_time = excluded.check_in_time,
                check_out_time = excluded.check_out_time,
                check_in_method = excluded.check_in_method,
                wifi_name = excluded.wifi_name,
                wifi_password = excluded.wifi_password,
                emergency_phone = excluded.emergency_phone,
                property_contact = excluded.property_contact,
                house_rules = excluded.house_rules,
                parking_info = excluded.parking_info,
                pet_policy = excluded.pet_policy,
                smoking_policy = excluded.smoking_policy,
                quiet_hours = excluded.quiet_hours,
                checkout_tasks = excluded.checkout_tasks,
                area_type = excluded.area_type,
                restaurants = excluded.restaurants,
                activities = excluded.activities,
                special_notes = excluded.special_notes,
                generated_guide = excluded.generated_guide",
            params![
                profile.id.to_string(),
                owner_id.to_string(),
                profile.created_at.to_rfc3339(),
                profile.property_name,
                profile.property_type.as_str(),
                profile.location,
                profile.host_name,
                profile.host_image_url,
                profile.hero_image_url,
                serde_json::to_string(&profile.additional_photos)?,
                serde_json::to_string(&profile.video_guides)?,
                profile.target_guest.as_str(),
                profile.check_in_time,
                profile.check_out_time,
                profile.check_in_method,
                profile.wifi_name,
                profile.wifi_password,
                profile.emergency_phone,
                profile.property_contact,
                serde_json::to_string(&profile.house_rules)?,
                profile.parking_info,
                profile.pet_policy,
                profile.smoking_policy,
                profile.quiet_hours,
                profile.checkout_tasks,
                profile.area_type.as_str(),
                profile.restaurants,
                profile.activities,
                profile.special_notes,
                profile.generated_guide,
            ],
        )?;
        Ok(())
    }

    /// Find a profile by its opaque id. This is also the unauthenticated
    /// guest lookup, so no owner filter is applied.
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<PropertyProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"))?;

        let profile = stmt
            .query_row(params![id.to_string()], profile_from_row)
            .optional()?;

        Ok(profile)
    }

    /// List an owner's profiles, newest first
    #[instrument(skip(self))]
    pub fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE owner_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![owner_id.to_string()], profile_from_row)?;
        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    /// Delete a profile by id
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM profiles WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    /// Overwrite only the cached generated document. Used by the view
    /// path, which regenerates without touching host-entered fields.
    #[instrument(skip(self, content))]
    pub fn cache_guide(&self, id: Uuid, content: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE profiles SET generated_guide = ?1 WHERE id = ?2",
            params![content, id.to_string()],
        )?;
        Ok(())
    }
}
