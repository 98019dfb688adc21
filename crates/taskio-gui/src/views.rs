pub mod auth;
pub mod board;
pub mod home;
pub mod profile;
pub mod shell;
pub mod task_form;

use std::rc::Rc;

use async_trait::async_trait;
use taskio_core::error::AppError;
use taskio_core::route::ViewInit;
use taskio_core::router::{
  RouteContext,
  ViewInitializer
};

use crate::app::AppContext;

/// Post-render wiring for every route.
pub struct AppInitializer {
  ctx: Rc<AppContext>
}

impl AppInitializer {
  pub fn new(ctx: Rc<AppContext>) -> Self {
    Self {
      ctx
    }
  }
}

#[async_trait(?Send)]
impl ViewInitializer for AppInitializer {
  #[tracing::instrument(skip(self, ctx), fields(route = %ctx.route))]
  async fn initialize(
    &self,
    init: ViewInit,
    ctx: &RouteContext
  ) -> Result<(), AppError> {
    match init {
      | ViewInit::Home => {
        home::init(&self.ctx).await
      }
      | ViewInit::Board => {
        board::init(&self.ctx).await
      }
      | ViewInit::TaskForm => {
        task_form::init_page(&self.ctx);
        Ok(())
      }
      | ViewInit::Login => {
        auth::init_login(&self.ctx);
        Ok(())
      }
      | ViewInit::Register => {
        auth::init_register(&self.ctx);
        Ok(())
      }
      | ViewInit::ResetPassword => {
        auth::init_reset(
          &self.ctx,
          &ctx.location
        );
        Ok(())
      }
      | ViewInit::Profile => {
        profile::init(&self.ctx).await
      }
    }
  }
}
