#[cfg(test)]
mod tests {
    use super::super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_production_runner_success() {
        let runner = runner::TokioProcessRunner;
        let command = ProcessCommandBuilder::new("echo")
            .arg("hello world")
            .build();

        let output = runner.run(command).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "hello world");
        assert!(output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_production_runner_failure() {
        let runner = runner::TokioProcessRunner;
        let command = ProcessCommandBuilder::new("false").build();

        let output = runner.run(command).await.unwrap();
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(1));
    }

    #[tokio::test]
    async fn test_production_runner_command_not_found() {
        let runner = runner::TokioProcessRunner;
        let command = ProcessCommandBuilder::new("nonexistent-command-12345").build();

        let result = runner.run(command).await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ProcessError::CommandNotFound(_)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_mock_runner_basic() {
        let mut mock = MockProcessRunner::new();

        mock.expect_command("p4")
            .with_args(|args| args == ["info"])
            .returns_stdout("Client name: ws\n")
            .returns_success()
            .finish();

        let output = mock
            .run(ProcessCommandBuilder::new("p4").arg("info").build())
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout, "Client name: ws\n");
        assert!(mock.verify_called("p4", 1));
    }

    #[tokio::test]
    async fn test_mock_runner_times_limit() {
        let mut mock = MockProcessRunner::new();

        mock.expect_command("p4")
            .with_args_prefix(&["edit"])
            .returns_success()
            .times(2)
            .finish();

        let edit = |path: &str| ProcessCommandBuilder::new("p4").args(["edit", path]).build();

        assert!(mock.run(edit("a")).await.is_ok());
        assert!(mock.run(edit("b")).await.is_ok());
        assert!(mock.run(edit("c")).await.is_err());
        assert_eq!(mock.count_subcommand("edit"), 3);
    }

    #[tokio::test]
    async fn test_mock_runner_not_found() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("p4").returns_not_found().finish();

        let result = mock
            .run(ProcessCommandBuilder::new("p4").arg("info").build())
            .await;
        assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_runner_unmatched_command() {
        let mock = MockProcessRunner::new();
        let result = mock
            .run(ProcessCommandBuilder::new("p4").arg("opened").build())
            .await;
        assert!(matches!(
            result,
            Err(ProcessError::MockExpectationNotMet(_))
        ));
    }

    #[tokio::test]
    async fn test_subprocess_manager() {
        let (manager, mut mock) = SubprocessManager::mock();

        mock.expect_command("p4")
            .with_args(|args| args == ["opened"])
            .returns_stdout("//depot/a.txt#1 - edit default change (text)\n")
            .finish();

        let output = manager.p4("p4").opened().await.unwrap();
        assert!(output.stdout.starts_with("//depot/a.txt"));
    }
}
