mod common;

use common::{context, user};
use rc_app::components::DismissReason;
use rc_app::pages::{AuthMode, SignupPage};
use rc_core::error::AppError;
use rc_core::models::SignUpOutcome;
use rc_core::routes::Route;
use rc_core::traits::{MockAuthProvider, MockDataGateway, MockObjectStore};
use rc_core::validation::Field;

fn fill(page: &mut SignupPage, fields: &[(Field, &str)]) {
    for (field, value) in fields {
        page.set_field(*field, *value).unwrap();
    }
}

#[tokio::test]
async fn register_verify_then_signed_in_at_home() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_up()
        .withf(|u, p, e| u == "newbie" && p == "password1" && e == "newbie@example.com")
        .times(1)
        .returning(|_, _, _| {
            Ok(SignUpOutcome { user_confirmed: false, code_destination: Some("n***@e***.com".into()) })
        });
    auth.expect_confirm_sign_up()
        .withf(|u, code| u == "newbie" && code == "123456")
        .times(1)
        .returning(|_, _| Ok(()));
    auth.expect_sign_in()
        .withf(|u, p| u == "newbie" && p == "password1")
        .times(1)
        .returning(|name, _| Ok(user(name)));
    let ctx = context(MockDataGateway::new(), MockObjectStore::new(), auth);

    let mut page = SignupPage::default();
    page.toggle();
    assert_eq!(page.mode(), AuthMode::Register);
    fill(
        &mut page,
        &[
            (Field::Username, "newbie"),
            (Field::Email, "newbie@example.com"),
            (Field::Password, "password1"),
            (Field::ConfirmPassword, "password1"),
        ],
    );
    assert_eq!(page.submit(&ctx).await.unwrap(), None);
    assert_eq!(page.mode(), AuthMode::Verify);
    assert!(!ctx.session.is_signed_in());

    fill(&mut page, &[(Field::Code, "123456")]);
    assert_eq!(page.submit(&ctx).await.unwrap(), Some(Route::Home));
    assert_eq!(ctx.session.username().as_deref(), Some("newbie"));
}

#[tokio::test]
async fn rejected_login_is_shown_and_form_kept() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_in()
        .times(1)
        .returning(|_, _| Err(AppError::Auth("User does not exist.".into())));
    let ctx = context(MockDataGateway::new(), MockObjectStore::new(), auth);

    let mut page = SignupPage::default();
    fill(&mut page, &[(Field::Username, "ghost"), (Field::Password, "password1")]);
    assert!(page.submit(&ctx).await.is_err());
    assert_eq!(page.mode(), AuthMode::Login);
    assert!(!page.is_loading());
    assert_eq!(page.notification().message(), Some("User does not exist."));

    page.dismiss(DismissReason::ClickAway);
    assert!(page.notification().is_open());
    page.dismiss(DismissReason::Close);
    assert!(!page.notification().is_open());
}

#[tokio::test]
async fn short_code_never_reaches_auth() {
    let mut auth = MockAuthProvider::new();
    auth.expect_confirm_sign_up().never();
    let ctx = context(MockDataGateway::new(), MockObjectStore::new(), auth);

    let mut page = SignupPage::default();
    page.set_mode(AuthMode::Verify);
    fill(&mut page, &[(Field::Username, "newbie"), (Field::Code, "123")]);
    assert!(matches!(page.submit(&ctx).await, Err(AppError::Validation(_))));
    assert_eq!(
        page.errors().get(Field::Code),
        Some("Your verification should be 6 characters long.")
    );
}

#[tokio::test]
async fn reset_mode_calls_nothing() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_in().never();
    auth.expect_sign_up().never();
    auth.expect_confirm_sign_up().never();
    let ctx = context(MockDataGateway::new(), MockObjectStore::new(), auth);

    let mut page = SignupPage::default();
    page.forgot_password();
    assert_eq!(page.mode(), AuthMode::Reset);
    fill(&mut page, &[(Field::Username, "forgetful")]);
    assert_eq!(page.submit(&ctx).await.unwrap(), None);
    assert!(!page.is_loading());
}
