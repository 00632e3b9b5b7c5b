//! Static schema table, one `EntitySchema` per entity.
//!
//! Mirrors the CSV field exports. Field order follows the export; column
//! names follow the common and per-entity field maps.
//! "Link" fields on tasks and published files are virtual: they are backed by
//! the polymorphic `entity_type` / `entity_id` pair, which callers set
//! explicitly.

use crate::entity::EntityKey;
use crate::schema::{EntitySchema, FieldDescriptor as F};

pub static ASSET: EntitySchema = EntitySchema {
    entity: EntityKey::Asset,
    table: "assets",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("asset_name", "Asset Name", "text", "name"),
        F::column("code", "Code", "text", "code"),
        F::column("type", "Type", "list", "asset_type"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("description", "Description", "text", "description"),
        F::column("status", "Status", "status_list", "status"),
        F::column("sequence", "Sequence", "entity", "sequence_id"),
        F::column("shot", "Shot", "entity", "shot_id"),
        F::column("client_name", "Client Name", "text", "client_name"),
        F::column("dd_client_name", "DD Client Name", "text", "dd_client_name"),
        F::column("keep", "Keep", "checkbox", "keep"),
        F::column("outsource", "Outsource", "checkbox", "outsource"),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("vendor_groups", "Vendor Groups", "multi_entity", "vendor_groups"),
        F::column("sub_assets", "Sub Assets", "multi_entity", "sub_assets"),
        F::column("parent_assets", "Parent Assets", "multi_entity", "parent_assets"),
        F::column("sequences", "Sequences", "multi_entity", "sequences"),
        F::column("shots", "Shots", "multi_entity", "shots"),
        F::column("task_template", "Task Template", "entity", "task_template"),
        F::column(
            "published_file_link",
            "Published File <-> Link",
            "multi_entity",
            "published_file_links",
        ),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("cached_display_name", "Cached Display Name", "text", "cached_display_name"),
        F::column("ayon_id", "Ayon ID", "text", "ayon_id"),
        F::column("ayon_sync_status", "Ayon Sync Status", "list", "ayon_sync_status"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static SEQUENCE: EntitySchema = EntitySchema {
    entity: EntityKey::Sequence,
    table: "sequences",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("sequence_name", "Sequence Name", "text", "name"),
        F::column("code", "Code", "text", "code"),
        F::column("type", "Type", "list", "sequence_type"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("description", "Description", "text", "description"),
        F::column("status", "Status", "status_list", "status"),
        F::column("client_name", "Client Name", "text", "client_name"),
        F::column("dd_client_name", "DD Client Name", "text", "dd_client_name"),
        F::column("cc", "Cc", "multi_entity", "cc"),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("shots", "Shots", "multi_entity", "shots"),
        F::column("assets", "Assets", "multi_entity", "assets"),
        F::column("plates", "Plates", "multi_entity", "plates"),
        F::column("cuts", "Cuts", "multi_entity", "cuts"),
        F::column("open_notes_count", "Open Notes Count", "summary", "open_notes_count"),
        F::column("task_template", "Task Template", "entity", "task_template"),
        F::column(
            "published_file_link",
            "Published File <-> Link",
            "multi_entity",
            "published_file_links",
        ),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static SHOT: EntitySchema = EntitySchema {
    entity: EntityKey::Shot,
    table: "shots",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("shot_name", "Shot Name", "text", "name"),
        F::column("shot_code", "Shot Code", "text", "code"),
        F::column("sequence", "Sequence", "entity", "sequence_id"),
        F::column("type", "Type", "list", "shot_type"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("description", "Description", "text", "description"),
        F::column("status", "Status", "status_list", "status"),
        F::column("client_name", "Client Name", "text", "client_name"),
        F::column("dd_client_name", "DD Client Name", "text", "dd_client_name"),
        F::column("cc", "Cc", "multi_entity", "cc"),
        F::column("comp_note", "Comp Note", "text", "comp_note"),
        F::column("cut_in", "Cut In", "number", "cut_in"),
        F::column("cut_out", "Cut Out", "number", "cut_out"),
        F::column("cut_duration", "Cut Duration", "number", "cut_duration"),
        F::column("cut_order", "Cut Order", "number", "cut_order"),
        F::column("head_in", "Head In", "number", "head_in"),
        F::column("head_out", "Head Out", "number", "head_out"),
        F::column("tail_in", "Tail In", "number", "tail_in"),
        F::column("tail_out", "Tail Out", "number", "tail_out"),
        F::column("working_duration", "Working Duration", "number", "working_duration"),
        F::column("delivery_date", "Delivery Date", "date", "delivery_date"),
        F::column("target_date", "Target Date", "date", "target_date"),
        F::column("next_review", "Next Review", "date", "next_review"),
        F::column("open_notes_count", "Open Notes Count", "summary", "open_notes_count"),
        F::column("parent_shots", "Parent Shots", "multi_entity", "parent_shots"),
        F::column("sub_shots", "Sub Shots", "multi_entity", "sub_shots"),
        F::column("plates", "Plates", "multi_entity", "plates"),
        F::column("seq_shot", "Seq Shot", "text", "seq_shot"),
        F::column("assets", "Assets", "multi_entity", "assets"),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("vendor_groups", "Vendor Groups", "multi_entity", "vendor_groups"),
        F::column("task_template", "Task Template", "entity", "task_template"),
        F::column(
            "published_file_link",
            "Published File <-> Link",
            "multi_entity",
            "published_file_links",
        ),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static TASK: EntitySchema = EntitySchema {
    entity: EntityKey::Task,
    table: "tasks",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("task_name", "Task Name", "text", "name"),
        F::virtual_field("link", "Link", "entity"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("status", "Status", "status_list", "status"),
        F::column("description", "Description", "text", "description"),
        F::column("assigned_to", "Assigned To", "multi_entity", "assigned_to"),
        F::column("pipeline_step", "Pipeline Step", "entity", "step_id"),
        F::column("priority", "Priority", "list", "priority"),
        F::column("due_date", "Due Date", "date", "due_date"),
        F::column("start_date", "Start Date", "date", "start_date"),
        F::column("end_date", "End Date", "date", "end_date"),
        F::column("duration", "Duration", "duration", "duration"),
        F::column("bid", "Bid", "duration", "bid"),
        F::column("bid_breakdown", "Bid Breakdown", "serializable", "bid_breakdown"),
        F::column("buffer_days", "Buffer Days", "number", "buffer_days"),
        F::column("casting", "Casting", "multi_entity", "casting"),
        F::column("cc", "Cc", "multi_entity", "cc"),
        F::column("milestone", "Milestone", "checkbox", "milestone"),
        F::column("prod_comments", "Prod Comments", "text", "prod_comments"),
        F::column("proposed_start_date", "Proposed Start Date", "date", "proposed_start_date"),
        F::column("reviewer", "Reviewer", "multi_entity", "reviewer"),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("task_complexity", "Task Complexity", "list", "task_complexity"),
        F::column("task_template", "Task Template", "entity", "task_template"),
        F::column("notes", "Notes", "text", "notes"),
        F::column("notes_multi_entity", "Notes", "multi_entity", "notes_links"),
        F::column("versions", "Versions", "multi_entity", "versions"),
        F::column(
            "workload_assignee_count",
            "Workload Assignee Count",
            "summary",
            "workload_assignee_count",
        ),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static VERSION: EntitySchema = EntitySchema {
    entity: EntityKey::Version,
    table: "versions",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("version_name", "Version Name", "text", "code"),
        F::column("version_number", "Version Number", "number", "version_number"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("task", "Task", "entity", "task_id"),
        F::column("artist", "Artist", "entity", "artist_id"),
        F::column("description", "Description", "text", "description"),
        F::column("status", "Status", "status_list", "status"),
        F::column("client_approved", "Client Approved", "checkbox", "client_approved"),
        F::column("client_approved_at", "Client Approved At", "date_time", "client_approved_at"),
        F::column("client_approved_by", "Client Approved by", "entity", "client_approved_by"),
        F::column("client_version_name", "Client Version Name", "text", "client_version_name"),
        F::column("date_viewed", "Date Viewed", "date_time", "date_viewed"),
        F::column("department", "Department", "entity", "department"),
        F::column("editorial_qc", "Editorial QC", "list", "editorial_qc"),
        F::column("flagged", "Flagged", "checkbox", "flagged"),
        F::column("movie_aspect_ratio", "Movie Aspect Ratio", "float", "movie_aspect_ratio"),
        F::column("movie_has_slate", "Movie Has Slate", "checkbox", "movie_has_slate"),
        F::column("nuke_script", "Nuke script", "entity", "nuke_script"),
        F::column("playlists", "Playlists", "multi_entity", "playlists"),
        F::column("published_files", "Published Files", "multi_entity", "published_files"),
        F::column("send_exrs", "Send EXRs", "checkbox", "send_exrs"),
        F::column("source_clip", "Source Clip", "entity", "source_clip"),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("task_template", "Task Template", "entity", "task_template"),
        F::column("type", "Type", "list", "version_type"),
        F::column("uploaded_movie", "Uploaded Movie", "url", "uploaded_movie"),
        F::column("viewed_unviewed", "Viewed/Unviewed", "status_list", "viewed_status"),
        F::column("cuts", "Cuts", "multi_entity", "cuts"),
        F::column("path_to_frames", "Path to Frames", "text", "frames_path"),
        F::column("path_to_movie", "Path to Movie", "text", "movie_url"),
        F::column("first_frame", "First Frame", "number", "first_frame"),
        F::column("last_frame", "Last Frame", "number", "last_frame"),
        F::column("frame_count", "Frame Count", "number", "frame_count"),
        F::column("frame_range", "Frame Range", "text", "frame_range"),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static NOTE: EntitySchema = EntitySchema {
    entity: EntityKey::Note,
    table: "notes",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("subject", "Subject", "text", "subject"),
        F::column("body", "Body", "text", "content"),
        F::column("author", "Author", "entity", "author_id"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("status", "Status", "status_list", "status"),
        F::column("type", "Type", "list", "note_type"),
        F::column("client_approved", "Client Approved", "checkbox", "client_approved"),
        F::column("client_note", "Client Note", "checkbox", "client_note"),
        F::column(
            "suppress_email_notification",
            "Suppress Email Notification",
            "checkbox",
            "suppress_email_notification",
        ),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "created_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static PUBLISHED_FILE: EntitySchema = EntitySchema {
    entity: EntityKey::PublishedFile,
    table: "published_files",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("published_file_name", "Published File Name", "text", "code"),
        F::column("name", "Name", "text", "name"),
        F::virtual_field("link", "Link", "entity"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("description", "Description", "text", "description"),
        F::column("status", "Status", "status_list", "status"),
        F::column("path", "Path", "url", "file_path"),
        F::column("published_file_type", "Published File Type", "entity", "file_type"),
        F::column("version_number", "Version Number", "number", "version_number"),
        F::column("task", "Task", "entity", "task_id"),
        F::column("version", "Version", "entity", "version_id"),
        F::column("client_version", "Client Version", "text", "client_version"),
        F::column(
            "downstream_published_files",
            "Downstream Published Files",
            "multi_entity",
            "downstream_published_files",
        ),
        F::column(
            "upstream_published_files",
            "Upstream Published Files",
            "multi_entity",
            "upstream_published_files",
        ),
        F::column("tags", "Tags", "multi_entity", "tags"),
        F::column("element", "Element", "text", "element"),
        F::column("output", "Output", "text", "output"),
        F::column("path_cache", "Path Cache", "text", "path_cache"),
        F::column("path_cache_storage", "Path Cache Storage", "entity", "path_cache_storage"),
        F::column("path_to_source", "Path to Source", "text", "path_to_source"),
        F::column("submission_notes", "Submission Notes", "text", "submission_notes"),
        F::column("snapshot_id", "Snapshot ID", "text", "snapshot_id"),
        F::column("snapshot_type", "Snapshot Type", "text", "snapshot_type"),
        F::column("target_name", "Target Name", "text", "target_name"),
        F::column("thumbnail", "Thumbnail", "image", "thumbnail_url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
        F::column("created_by", "Created by", "entity", "published_by"),
        F::column("updated_by", "Updated by", "entity", "updated_by"),
    ],
};

pub static POST: EntitySchema = EntitySchema {
    entity: EntityKey::Post,
    table: "posts",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("project", "Project", "entity", "project_id"),
        F::column("author", "Author", "entity", "author_id"),
        F::column("content", "Content", "text", "content"),
        F::column("content_html", "Content HTML", "text", "content_html"),
        F::column("visibility", "Visibility", "list", "visibility"),
        F::column("comment_count", "Comment Count", "summary", "comment_count"),
        F::column("reaction_count", "Reaction Count", "summary", "reaction_count"),
        F::virtual_field("entities", "Entities", "multi_entity"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
    ],
};

pub static POST_MEDIA: EntitySchema = EntitySchema {
    entity: EntityKey::PostMedia,
    table: "post_media",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("post", "Post", "entity", "post_id"),
        F::column("storage_path", "Storage Path", "text", "storage_path"),
        F::column("file_name", "File Name", "text", "file_name"),
        F::column("file_size", "File Size", "number", "file_size"),
        F::column("mime_type", "Mime Type", "text", "mime_type"),
        F::column("media_type", "Media Type", "list", "media_type"),
        F::column("width", "Width", "number", "width"),
        F::column("height", "Height", "number", "height"),
        F::column("duration_seconds", "Duration Seconds", "float", "duration_seconds"),
        F::column("frame_count", "Frame Count", "number", "frame_count"),
        F::column("fps", "FPS", "float", "fps"),
        F::column("sort_order", "Sort Order", "number", "sort_order"),
        F::virtual_field("preview_url", "Preview", "url"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
    ],
};

pub static POST_REACTION: EntitySchema = EntitySchema {
    entity: EntityKey::PostReaction,
    table: "post_reactions",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("post", "Post", "entity", "post_id"),
        F::column("comment", "Comment", "entity", "comment_id"),
        F::column("user", "User", "entity", "user_id"),
        F::column("reaction_type", "Reaction Type", "list", "reaction_type"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
    ],
};

pub static ANNOTATION: EntitySchema = EntitySchema {
    entity: EntityKey::Annotation,
    table: "annotations",
    fields: &[
        F::column("id", "Id", "number", "id"),
        F::column("post_media", "Post Media", "entity", "post_media_id"),
        F::column("version", "Version", "entity", "version_id"),
        F::column("author", "Author", "entity", "author_id"),
        F::column("frame_number", "Frame Number", "number", "frame_number"),
        F::column("timecode", "Timecode", "text", "timecode"),
        F::column("annotation_data", "Annotation Data", "serializable", "annotation_data"),
        F::column("annotation_text", "Annotation Text", "text", "annotation_text"),
        F::column("status", "Status", "status_list", "status"),
        F::column("date_created", "Date Created", "date_time", "created_at"),
        F::column("date_updated", "Date Updated", "date_time", "updated_at"),
    ],
};
