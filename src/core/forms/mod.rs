pub mod forms_models;
pub mod forms_service;
pub mod question_builder;

pub use forms_models::{
    BatchRequest, Form, FormInfo, FormItem, FormResponse, PublishSettings, QuestionDescriptor,
    ResponsePage,
};
pub use forms_service::{FormsApi, FormsError, FormsService, NewForm};
