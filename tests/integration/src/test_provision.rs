//! Provisioning integration tests.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aws_sdk_sqs::types::QueueAttributeName;
    use ruststack_provision_core::{Provisioner, naming};
    use tokio_util::sync::CancellationToken;

    use crate::{cleanup, config_from_yaml, provider, sns_client, sqs_client, test_environment};

    const QUEUE_WITH_TOPIC: &str = r"
queues:
  - name: jobs
    sns_topics:
      - name: events
    dead_letter_queue:
      enabled: true
      max_receive_count: 4
";

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_provision_queue_with_dlq_and_subscription() {
        let env = test_environment("it");
        let config = config_from_yaml(&env, QUEUE_WITH_TOPIC);

        let mut provisioner = Provisioner::new(provider(), config);
        provisioner.run().await.expect("provisioning should succeed");
        let (_, config) = provisioner.into_parts();

        let queue = &config.queues[0];
        assert_eq!(queue.full_name, format!("itest_{env}_jobs"));
        let url = queue.url.clone().expect("queue url recorded");

        let sqs = sqs_client();
        let found = sqs
            .get_queue_url()
            .queue_name(&queue.full_name)
            .send()
            .await
            .expect("queue exists");
        assert_eq!(found.queue_url(), Some(url.as_str()));

        let dlq_name = naming::dead_letter_queue_name(queue).expect("dlq enabled");
        sqs.get_queue_url()
            .queue_name(&dlq_name)
            .send()
            .await
            .expect("dlq exists");

        let attrs = sqs
            .get_queue_attributes()
            .queue_url(&url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await
            .expect("attributes readable");
        let attrs = attrs.attributes().expect("attributes present");

        let redrive: serde_json::Value = serde_json::from_str(
            attrs
                .get(&QueueAttributeName::RedrivePolicy)
                .expect("redrive policy set"),
        )
        .unwrap();
        assert!(
            redrive["deadLetterTargetArn"]
                .as_str()
                .unwrap()
                .ends_with(&dlq_name)
        );
        assert_eq!(redrive["maxReceiveCount"].to_string().trim_matches('"'), "4");

        let policy = attrs
            .get(&QueueAttributeName::Policy)
            .expect("access policy set");
        assert!(policy.contains("sqs:SendMessage"));

        let topic_name = &queue.sns_topics[0].full_name;
        let sns = sns_client();
        let topic_arn = format!("arn:aws:sns:{}:{}:{topic_name}", crate::REGION, crate::ACCOUNT_ID);
        let subs = sns
            .list_subscriptions_by_topic()
            .topic_arn(&topic_arn)
            .send()
            .await
            .expect("subscriptions listed");
        let sub = subs
            .subscriptions()
            .iter()
            .find(|s| s.protocol() == Some("sqs"))
            .expect("sqs subscription exists");

        let sub_attrs = sns
            .get_subscription_attributes()
            .subscription_arn(sub.subscription_arn().unwrap())
            .send()
            .await
            .expect("subscription attributes readable");
        assert_eq!(
            sub_attrs
                .attributes()
                .and_then(|a| a.get("RawMessageDelivery"))
                .map(String::as_str),
            Some("true")
        );

        cleanup(&config).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_provision_fifo_names() {
        let env = test_environment("it");
        let config = config_from_yaml(
            &env,
            r"
queues:
  - name: orders
    fifo: true
    sns_topics:
      - name: order_events
        fifo: true
    dead_letter_queue:
      enabled: true
      suffix: _dlq
",
        );

        let mut provisioner = Provisioner::new(provider(), config);
        provisioner.run().await.expect("provisioning should succeed");
        let (_, config) = provisioner.into_parts();

        let queue = &config.queues[0];
        assert_eq!(queue.full_name, format!("itest_{env}_orders.fifo"));
        let dlq_name = format!("itest_{env}_orders_dlq.fifo");
        assert_eq!(
            naming::dead_letter_queue_name(queue).as_deref(),
            Some(dlq_name.as_str())
        );
        sqs_client()
            .get_queue_url()
            .queue_name(&dlq_name)
            .send()
            .await
            .expect("fifo dlq exists");

        let attrs = sqs_client()
            .get_queue_attributes()
            .queue_url(queue.url.as_deref().unwrap())
            .attribute_names(QueueAttributeName::FifoQueue)
            .send()
            .await
            .expect("attributes readable");
        assert_eq!(
            attrs
                .attributes()
                .and_then(|a| a.get(&QueueAttributeName::FifoQueue))
                .map(String::as_str),
            Some("true")
        );

        cleanup(&config).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deliver_raw_message_from_topic_to_queue() {
        let env = test_environment("it");
        let config = config_from_yaml(&env, QUEUE_WITH_TOPIC);

        let mut provisioner = Provisioner::new(provider(), config);
        provisioner.run().await.expect("provisioning should succeed");
        let (_, config) = provisioner.into_parts();

        let queue = &config.queues[0];
        let url = queue.url.clone().unwrap();
        let topic_arn = format!(
            "arn:aws:sns:{}:{}:{}",
            crate::REGION,
            crate::ACCOUNT_ID,
            queue.sns_topics[0].full_name
        );

        sns_client()
            .publish()
            .topic_arn(&topic_arn)
            .message("hello from topic")
            .send()
            .await
            .expect("publish should succeed");

        let received = sqs_client()
            .receive_message()
            .queue_url(&url)
            .wait_time_seconds(5)
            .send()
            .await
            .expect("receive should succeed");
        let bodies: Vec<_> = received.messages().iter().filter_map(|m| m.body()).collect();
        assert_eq!(bodies, vec!["hello from topic"]);

        cleanup(&config).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_rerun_against_existing_resources() {
        let env = test_environment("it");
        let config = config_from_yaml(&env, QUEUE_WITH_TOPIC);

        let mut first = Provisioner::new(provider(), config.clone());
        first.run().await.expect("first run should succeed");
        let first_url = first.config().queues[0].url.clone();

        let mut second = Provisioner::new(provider(), config);
        second.run().await.expect("second run should succeed");
        assert_eq!(second.config().queues[0].url, first_url);

        let (_, config) = second.into_parts();
        cleanup(&config).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_not_create_resources_when_cancelled() {
        let env = test_environment("it");
        let config = config_from_yaml(&env, QUEUE_WITH_TOPIC);

        let token = CancellationToken::new();
        token.cancel();

        let mut provisioner = Provisioner::new(provider(), config).with_cancellation(token);
        let err = provisioner.run().await.unwrap_err();
        assert!(err.to_string().contains("failed to create"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        let name = naming::full_name("itest", &env, "jobs", false);
        let lookup = sqs_client().get_queue_url().queue_name(&name).send().await;
        assert!(lookup.is_err());
    }
}
