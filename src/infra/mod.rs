pub mod http_client;
pub mod supabase_store;
pub mod template_copywriter;
