pub mod auth_client;
pub mod category_client;
pub mod design_client;
pub mod order_client;
pub mod product_client;
pub mod project_client;
pub mod timeline_client;

pub use auth_client::{
    AcceptInvitationRequest, AuthClient, ForgotPasswordRequest, ResetPasswordRequest,
    SignInRequest,
};
pub use category_client::{CategoryClient, CategoryForm};
pub use design_client::{DesignClient, DesignForm};
pub use order_client::OrderClient;
pub use product_client::{ProductClient, ProductForm};
pub use project_client::{ProjectClient, ProjectForm};
pub use timeline_client::{TimelineClient, TimelineForm};
