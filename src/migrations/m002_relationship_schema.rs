//! Relationship table: subject/predicate/object triples.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::AppError;
use crate::migrations::Migration;
use crate::store::SqlExecutor;

pub struct M002RelationshipSchema;

impl Migration for M002RelationshipSchema {
    fn id(&self) -> &'static str {
        "m002_relationship_schema"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Triple table with uniqueness and cascading entity references"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + Sync)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            ctx.execute_sql(
                r#"
                CREATE TABLE IF NOT EXISTS entity_relationship (
                    id BIGSERIAL PRIMARY KEY,
                    subject_id BIGINT NOT NULL REFERENCES entity (id) ON DELETE CASCADE,
                    predicate_id BIGINT NOT NULL REFERENCES entity (id) ON DELETE CASCADE,
                    object_id BIGINT NOT NULL REFERENCES entity (id) ON DELETE CASCADE,
                    weight DOUBLE PRECISION,
                    meta JSONB NOT NULL DEFAULT '{}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT uq_triple_subject_pred_obj
                        UNIQUE (subject_id, predicate_id, object_id)
                );

                CREATE INDEX IF NOT EXISTS entity_relationship_predicate_idx
                ON entity_relationship (predicate_id);

                CREATE INDEX IF NOT EXISTS entity_relationship_object_idx
                ON entity_relationship (object_id);
                "#,
            )
            .await?;

            Ok(())
        }
        .boxed()
    }
}
